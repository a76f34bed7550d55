//! Peripherique (mouse, screen, cable, ...) model.
//!
//! # Responsibility
//! - Define the fixed peripheral type catalogue.
//! - Own attachment rules between a peripheral and a computer or a nomadic
//!   object.
//! - Own the active flag and the free-text comment set.
//!
//! # Invariants
//! - `kind` is always one of the catalogue entries.
//! - `appareil_id` (owning device) is always set.
//! - Attachment to a computer and to a nomadic object are mutually exclusive.
//! - Available means active and unattached.

use crate::model::appareil::{AppareilCategorie, AppareilId};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type PeripheriqueId = i64;

const TYPE_MAX_CHARS: usize = 30;

/// Fixed peripheral catalogue. Serialized as its code; deserialized through
/// `FromStr`, so labels and any-case codes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TypePeripherique {
    Souris,
    Clavier,
    Ecran,
    Imprimante,
    Casque,
    Cable,
}

impl TypePeripherique {
    pub const ALL: [TypePeripherique; 6] = [
        Self::Souris,
        Self::Clavier,
        Self::Ecran,
        Self::Imprimante,
        Self::Casque,
        Self::Cable,
    ];

    /// Display label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Souris => "Souris",
            Self::Clavier => "Clavier",
            Self::Ecran => "Écran",
            Self::Imprimante => "Imprimante",
            Self::Casque => "Casque",
            Self::Cable => "Cable",
        }
    }

    /// Stable wire/form code (`SOURIS`, `ECRAN`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Self::Souris => "SOURIS",
            Self::Clavier => "CLAVIER",
            Self::Ecran => "ECRAN",
            Self::Imprimante => "IMPRIMANTE",
            Self::Casque => "CASQUE",
            Self::Cable => "CABLE",
        }
    }

    pub fn as_db(self) -> &'static str {
        match self {
            Self::Souris => "souris",
            Self::Clavier => "clavier",
            Self::Ecran => "ecran",
            Self::Imprimante => "imprimante",
            Self::Casque => "casque",
            Self::Cable => "cable",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_db() == value)
    }
}

impl Display for TypePeripherique {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TypePeripherique {
    type Err = ValidationError;

    /// Accepts a code (`ecran`, `ECRAN`) or a label (`Écran`, `Ecran`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankField("type"));
        }
        if trimmed.chars().count() > TYPE_MAX_CHARS {
            return Err(ValidationError::FieldTooLong {
                field: "type",
                max: TYPE_MAX_CHARS,
            });
        }

        let folded = trimmed.to_lowercase().replace(['é', 'è', 'ê'], "e");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_db() == folded)
            .ok_or_else(|| ValidationError::UnknownPeripheriqueType(trimmed.to_string()))
    }
}

impl TryFrom<String> for TypePeripherique {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Optional exclusive attachment of a peripheral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "appareil_id", rename_all = "snake_case")]
pub enum Rattachement {
    #[default]
    Aucun,
    Ordinateur(AppareilId),
    ObjetNomade(AppareilId),
}

impl Rattachement {
    pub fn appareil_id(self) -> Option<AppareilId> {
        match self {
            Self::Aucun => None,
            Self::Ordinateur(id) | Self::ObjetNomade(id) => Some(id),
        }
    }

    /// Device category the target must belong to, if any.
    pub fn required_categorie(self) -> Option<AppareilCategorie> {
        match self {
            Self::Aucun => None,
            Self::Ordinateur(_) => Some(AppareilCategorie::Ordinateur),
            Self::ObjetNomade(_) => Some(AppareilCategorie::ObjetNomade),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Aucun => "Aucun appareil associé",
            Self::Ordinateur(_) => "Ordinateur",
            Self::ObjetNomade(_) => "Objet Nomade",
        }
    }
}

impl Display for Rattachement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.appareil_id() {
            Some(id) => write!(f, "{} #{id}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Attachment rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// Peripheral is on a nomadic object; detach it first.
    AlreadyAttachedToObjetNomade(AppareilId),
    /// Peripheral is on a computer; detach it first.
    AlreadyAttachedToOrdinateur(AppareilId),
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAttachedToObjetNomade(id) => {
                write!(f, "peripherique is already attached to objet nomade {id}")
            }
            Self::AlreadyAttachedToOrdinateur(id) => {
                write!(f, "peripherique is already attached to ordinateur {id}")
            }
        }
    }
}

impl Error for AttachmentError {}

/// Persisted peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peripherique {
    pub id: PeripheriqueId,
    #[serde(rename = "type")]
    pub kind: TypePeripherique,
    /// Owning device.
    pub appareil_id: AppareilId,
    #[serde(default)]
    pub rattachement: Rattachement,
    pub actif: bool,
    #[serde(default)]
    pub commentaires: BTreeSet<String>,
}

impl Peripherique {
    /// Active, unattached peripheral with no comments.
    pub fn new(id: PeripheriqueId, kind: TypePeripherique, appareil_id: AppareilId) -> Self {
        Self {
            id,
            kind,
            appareil_id,
            rattachement: Rattachement::Aucun,
            actif: true,
            commentaires: BTreeSet::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.appareil_id > 0
    }

    pub fn is_attached_to_ordinateur(&self) -> bool {
        matches!(self.rattachement, Rattachement::Ordinateur(_))
    }

    pub fn is_attached_to_objet_nomade(&self) -> bool {
        matches!(self.rattachement, Rattachement::ObjetNomade(_))
    }

    /// Attaches to a computer, replacing any previous computer.
    pub fn attach_to_ordinateur(&mut self, ordinateur_id: AppareilId) -> Result<(), AttachmentError> {
        if let Rattachement::ObjetNomade(current) = self.rattachement {
            return Err(AttachmentError::AlreadyAttachedToObjetNomade(current));
        }
        self.rattachement = Rattachement::Ordinateur(ordinateur_id);
        Ok(())
    }

    /// Attaches to a nomadic object, replacing any previous nomadic object.
    pub fn attach_to_objet_nomade(&mut self, objet_id: AppareilId) -> Result<(), AttachmentError> {
        if let Rattachement::Ordinateur(current) = self.rattachement {
            return Err(AttachmentError::AlreadyAttachedToOrdinateur(current));
        }
        self.rattachement = Rattachement::ObjetNomade(objet_id);
        Ok(())
    }

    /// Applies `target` through the exclusive attach helpers.
    pub fn attach(&mut self, target: Rattachement) -> Result<(), AttachmentError> {
        match target {
            Rattachement::Aucun => {
                self.detach();
                Ok(())
            }
            Rattachement::Ordinateur(id) => self.attach_to_ordinateur(id),
            Rattachement::ObjetNomade(id) => self.attach_to_objet_nomade(id),
        }
    }

    /// Clears any attachment. Returns `false` when nothing was attached.
    pub fn detach(&mut self) -> bool {
        if self.rattachement == Rattachement::Aucun {
            return false;
        }
        self.rattachement = Rattachement::Aucun;
        true
    }

    pub fn is_available(&self) -> bool {
        self.actif && self.rattachement == Rattachement::Aucun
    }

    /// Returns whether the flag actually changed.
    pub fn set_actif(&mut self, actif: bool) -> bool {
        if self.actif == actif {
            return false;
        }
        self.actif = actif;
        true
    }

    pub fn attachment_label(&self) -> &'static str {
        self.rattachement.label()
    }

    pub fn is_of_type(&self, kind: TypePeripherique) -> bool {
        self.kind == kind
    }

    /// Adds a trimmed comment. Blank input is ignored.
    pub fn add_commentaire(&mut self, commentaire: &str) -> bool {
        let trimmed = commentaire.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.commentaires.insert(trimmed.to_string())
    }

    pub fn remove_commentaire(&mut self, commentaire: &str) -> bool {
        self.commentaires.remove(commentaire)
    }
}

/// Create payload for a peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPeripherique {
    #[serde(rename = "type")]
    pub kind: TypePeripherique,
    pub appareil_id: AppareilId,
    #[serde(default = "default_actif")]
    pub actif: bool,
}

fn default_actif() -> bool {
    true
}

impl NewPeripherique {
    pub fn new(kind: TypePeripherique, appareil_id: AppareilId) -> Self {
        Self {
            kind,
            appareil_id,
            actif: true,
        }
    }
}
