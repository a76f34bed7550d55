//! One-shot outcome messages carried through a redirect as `?flash=<code>`.

/// Alert shown after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    PersonneCreated,
    PersonneUpdated,
    PersonneDeleted,
    PersonneAffected,
    PeripheriqueCreated,
    PeripheriqueUpdated,
    PeripheriqueDeleted,
    PeripheriqueAffected,
    CommentaireAdded,
    CommentaireRemoved,
    ActifUpdated,
    CommentaireRequired,
    Error,
}

impl Flash {
    const ALL: [Flash; 13] = [
        Self::PersonneCreated,
        Self::PersonneUpdated,
        Self::PersonneDeleted,
        Self::PersonneAffected,
        Self::PeripheriqueCreated,
        Self::PeripheriqueUpdated,
        Self::PeripheriqueDeleted,
        Self::PeripheriqueAffected,
        Self::CommentaireAdded,
        Self::CommentaireRemoved,
        Self::ActifUpdated,
        Self::CommentaireRequired,
        Self::Error,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::PersonneCreated => "personne_created",
            Self::PersonneUpdated => "personne_updated",
            Self::PersonneDeleted => "personne_deleted",
            Self::PersonneAffected => "personne_affected",
            Self::PeripheriqueCreated => "peripherique_created",
            Self::PeripheriqueUpdated => "peripherique_updated",
            Self::PeripheriqueDeleted => "peripherique_deleted",
            Self::PeripheriqueAffected => "peripherique_affected",
            Self::CommentaireAdded => "commentaire_added",
            Self::CommentaireRemoved => "commentaire_removed",
            Self::ActifUpdated => "actif_updated",
            Self::CommentaireRequired => "commentaire_required",
            Self::Error => "error",
        }
    }

    /// Unknown codes yield `None` and render no alert.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    /// Alert CSS modifier: `success` or `danger`.
    pub fn kind(self) -> &'static str {
        match self {
            Self::CommentaireRequired | Self::Error => "danger",
            _ => "success",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::PersonneCreated => "La personne a bien été créée !",
            Self::PersonneUpdated => "La personne a bien été modifiée !",
            Self::PersonneDeleted => "La personne a bien été supprimée !",
            Self::PersonneAffected => "Appareils affectés!",
            Self::PeripheriqueCreated => "Le périphérique a bien été créé !",
            Self::PeripheriqueUpdated | Self::PeripheriqueAffected => {
                "Le périphérique a bien été modifié !"
            }
            Self::PeripheriqueDeleted => "Le périphérique a bien été supprimé !",
            Self::CommentaireAdded => "Le commentaire a bien été ajouté !",
            Self::CommentaireRemoved => "Le commentaire a bien été supprimé !",
            Self::ActifUpdated => "Le statut du périphérique a bien été modifié !",
            Self::CommentaireRequired => {
                "Un commentaire est obligatoire pour réaffecter le périphérique !"
            }
            Self::Error => "Un problème a été rencontré!",
        }
    }
}
