//! Peripherique use-case service.
//!
//! # Responsibility
//! - Provide peripheral CRUD, lookups by type/state, comment and active-flag
//!   management.
//! - Attach/detach peripherals to computers and nomadic objects.
//!
//! # Invariants
//! - The owning device must exist on create and update.
//! - An attachment target must exist and belong to the matching category.
//! - Moving an attached peripheral to another device of the same family
//!   requires a non-blank comment, which is recorded in the comment set.
//! - Switching family (computer <-> nomadic object) requires a detach first.

use crate::model::appareil::{AppareilCategorie, AppareilId};
use crate::model::peripherique::{
    AttachmentError, NewPeripherique, Peripherique, PeripheriqueId, Rattachement,
    TypePeripherique,
};
use crate::model::validation::ValidationError;
use crate::repo::appareil_repo::AppareilRepository;
use crate::repo::peripherique_repo::{PeripheriqueListQuery, PeripheriqueRepository};
use crate::repo::RepoError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for peripheral use-cases.
#[derive(Debug)]
pub enum PeripheriqueServiceError {
    Validation(ValidationError),
    PeripheriqueNotFound(PeripheriqueId),
    AppareilNotFound(AppareilId),
    /// Attachment target exists but is not of the expected family.
    WrongCategorie {
        appareil_id: AppareilId,
        expected: AppareilCategorie,
        actual: AppareilCategorie,
    },
    Attachment(AttachmentError),
    /// Same-family move attempted without a tracking comment.
    ReassignmentRequiresComment(PeripheriqueId),
    Repo(RepoError),
}

impl Display for PeripheriqueServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PeripheriqueNotFound(id) => write!(f, "peripherique not found: {id}"),
            Self::AppareilNotFound(id) => write!(f, "appareil not found: {id}"),
            Self::WrongCategorie {
                appareil_id,
                expected,
                actual,
            } => write!(
                f,
                "appareil {appareil_id} is `{}`, expected `{}`",
                actual.as_db(),
                expected.as_db()
            ),
            Self::Attachment(err) => write!(f, "{err}"),
            Self::ReassignmentRequiresComment(id) => write!(
                f,
                "peripherique {id} is already attached; a comment is required to reassign it"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PeripheriqueServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Attachment(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PeripheriqueServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "peripherique",
                id,
            } => Self::PeripheriqueNotFound(id),
            RepoError::NotFound {
                entity: "appareil",
                id,
            } => Self::AppareilNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<AttachmentError> for PeripheriqueServiceError {
    fn from(value: AttachmentError) -> Self {
        Self::Attachment(value)
    }
}

/// Editable fields of an existing peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheriqueUpdate {
    #[serde(rename = "type")]
    pub kind: TypePeripherique,
    pub appareil_id: AppareilId,
}

/// Peripheral service over a peripheral repository and a device repository.
pub struct PeripheriqueService<P: PeripheriqueRepository, A: AppareilRepository> {
    repo: P,
    appareils: A,
}

impl<P: PeripheriqueRepository, A: AppareilRepository> PeripheriqueService<P, A> {
    pub fn new(repo: P, appareils: A) -> Self {
        Self { repo, appareils }
    }

    pub fn list_peripheriques(
        &self,
        query: &PeripheriqueListQuery,
    ) -> Result<Vec<Peripherique>, PeripheriqueServiceError> {
        self.repo.list_peripheriques(query).map_err(Into::into)
    }

    pub fn find_by_type(
        &self,
        kind: TypePeripherique,
    ) -> Result<Vec<Peripherique>, PeripheriqueServiceError> {
        self.list_peripheriques(&PeripheriqueListQuery {
            kind: Some(kind),
            ..PeripheriqueListQuery::default()
        })
    }

    /// Peripherals currently in service.
    pub fn find_actifs(&self) -> Result<Vec<Peripherique>, PeripheriqueServiceError> {
        self.list_peripheriques(&PeripheriqueListQuery {
            actif: Some(true),
            ..PeripheriqueListQuery::default()
        })
    }

    /// Peripherals that are active and unattached.
    pub fn find_disponibles(&self) -> Result<Vec<Peripherique>, PeripheriqueServiceError> {
        self.list_peripheriques(&PeripheriqueListQuery {
            disponible: Some(true),
            ..PeripheriqueListQuery::default()
        })
    }

    pub fn get_peripherique(
        &self,
        id: PeripheriqueId,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        self.repo
            .get_peripherique(id)?
            .ok_or(PeripheriqueServiceError::PeripheriqueNotFound(id))
    }

    pub fn create_peripherique(
        &self,
        new: &NewPeripherique,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let id = self.repo.create_peripherique(new)?;
        info!(
            "event=peripherique_create module=service status=ok peripherique_id={} type={}",
            id,
            new.kind.as_db()
        );
        self.get_peripherique(id)
    }

    /// Changes type and owning device. Attachment and comments are kept.
    pub fn update_peripherique(
        &self,
        id: PeripheriqueId,
        update: &PeripheriqueUpdate,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let mut peripherique = self.get_peripherique(id)?;
        peripherique.kind = update.kind;
        peripherique.appareil_id = update.appareil_id;
        self.save(peripherique, "peripherique_update")
    }

    pub fn delete_peripherique(&self, id: PeripheriqueId) -> Result<(), PeripheriqueServiceError> {
        self.repo.delete_peripherique(id)?;
        info!("event=peripherique_delete module=service status=ok peripherique_id={id}");
        Ok(())
    }

    /// Adds a comment. Blank comments are ignored.
    pub fn add_commentaire(
        &self,
        id: PeripheriqueId,
        commentaire: &str,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let mut peripherique = self.get_peripherique(id)?;
        if !peripherique.add_commentaire(commentaire) {
            return Ok(peripherique);
        }
        self.save(peripherique, "peripherique_comment_add")
    }

    pub fn remove_commentaire(
        &self,
        id: PeripheriqueId,
        commentaire: &str,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let mut peripherique = self.get_peripherique(id)?;
        if !peripherique.remove_commentaire(commentaire) {
            return Ok(peripherique);
        }
        self.save(peripherique, "peripherique_comment_remove")
    }

    pub fn set_actif(
        &self,
        id: PeripheriqueId,
        actif: bool,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let mut peripherique = self.get_peripherique(id)?;
        if !peripherique.set_actif(actif) {
            return Ok(peripherique);
        }
        self.save(peripherique, "peripherique_set_actif")
    }

    /// Attaches a peripheral to `target`.
    ///
    /// # Contract
    /// - `Rattachement::Aucun` behaves like `detach`.
    /// - Re-attaching to the current target is a no-op.
    /// - Moving to another device of the same family requires `commentaire`.
    /// - Moving across families fails with `Attachment`; detach first.
    pub fn attach(
        &self,
        id: PeripheriqueId,
        target: Rattachement,
        commentaire: Option<&str>,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        if target == Rattachement::Aucun {
            return self.detach(id, commentaire);
        }

        let mut peripherique = self.get_peripherique(id)?;
        self.ensure_target_categorie(target)?;

        let previous = peripherique.rattachement;
        if previous == target {
            return Ok(peripherique);
        }

        let commentaire = non_blank(commentaire);
        peripherique.attach(target)?;

        match (previous, commentaire) {
            (Rattachement::Aucun, None) => {}
            (Rattachement::Aucun, Some(text)) => {
                peripherique.add_commentaire(&format!("Affectation {target} : {text}"));
            }
            (_, None) => {
                warn!(
                    "event=peripherique_attach module=service status=rejected peripherique_id={id} reason=missing_comment"
                );
                return Err(PeripheriqueServiceError::ReassignmentRequiresComment(id));
            }
            (_, Some(text)) => {
                peripherique.add_commentaire(&format!(
                    "Réaffectation {previous} -> {target} : {text}"
                ));
            }
        }

        self.save(peripherique, "peripherique_attach")
    }

    /// Clears the attachment, recording `commentaire` when one is given.
    pub fn detach(
        &self,
        id: PeripheriqueId,
        commentaire: Option<&str>,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        let mut peripherique = self.get_peripherique(id)?;
        let previous = peripherique.rattachement;
        if !peripherique.detach() {
            return Ok(peripherique);
        }
        if let Some(text) = non_blank(commentaire) {
            peripherique.add_commentaire(&format!("Désaffectation {previous} : {text}"));
        }
        self.save(peripherique, "peripherique_detach")
    }

    fn ensure_target_categorie(&self, target: Rattachement) -> Result<(), PeripheriqueServiceError> {
        let (Some(appareil_id), Some(expected)) = (target.appareil_id(), target.required_categorie())
        else {
            return Ok(());
        };

        let appareil = self
            .appareils
            .get_appareil(appareil_id)?
            .ok_or(PeripheriqueServiceError::AppareilNotFound(appareil_id))?;
        if appareil.categorie != expected {
            return Err(PeripheriqueServiceError::WrongCategorie {
                appareil_id,
                expected,
                actual: appareil.categorie,
            });
        }
        Ok(())
    }

    fn save(
        &self,
        peripherique: Peripherique,
        event: &'static str,
    ) -> Result<Peripherique, PeripheriqueServiceError> {
        self.repo.save_peripherique(&peripherique)?;
        info!(
            "event={} module=service status=ok peripherique_id={}",
            event, peripherique.id
        );
        self.get_peripherique(peripherique.id)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
