//! Personne use-case service.
//!
//! # Responsibility
//! - Provide person CRUD with read-back of the stored record.
//! - Assign devices to a person (full replacement).
//!
//! # Invariants
//! - Device ids are deduplicated and sorted before assignment.
//! - Unknown device ids fail the whole assignment.

use crate::model::appareil::AppareilId;
use crate::model::personne::{Personne, PersonneId, PersonneInput};
use crate::model::validation::{positive_id, ValidationError};
use crate::repo::personne_repo::PersonneRepository;
use crate::repo::RepoError;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonneServiceError {
    Validation(ValidationError),
    PersonneNotFound(PersonneId),
    AppareilNotFound(AppareilId),
    Repo(RepoError),
}

impl Display for PersonneServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PersonneNotFound(id) => write!(f, "personne not found: {id}"),
            Self::AppareilNotFound(id) => write!(f, "appareil not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonneServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PersonneServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "personne",
                id,
            } => Self::PersonneNotFound(id),
            RepoError::NotFound {
                entity: "appareil",
                id,
            } => Self::AppareilNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for PersonneServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Person service facade over repository implementations.
pub struct PersonneService<R: PersonneRepository> {
    repo: R,
}

impl<R: PersonneRepository> PersonneService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_personnes(&self) -> Result<Vec<Personne>, PersonneServiceError> {
        self.repo.list_personnes().map_err(Into::into)
    }

    /// Gets one person; missing ids are an error, not `None`.
    pub fn get_personne(&self, id: PersonneId) -> Result<Personne, PersonneServiceError> {
        self.repo
            .get_personne(id)?
            .ok_or(PersonneServiceError::PersonneNotFound(id))
    }

    pub fn create_personne(&self, input: &PersonneInput) -> Result<Personne, PersonneServiceError> {
        let id = self.repo.create_personne(input)?;
        info!("event=personne_create module=service status=ok personne_id={id}");
        self.get_personne(id)
    }

    pub fn update_personne(
        &self,
        id: PersonneId,
        input: &PersonneInput,
    ) -> Result<Personne, PersonneServiceError> {
        self.repo.update_personne(id, input)?;
        info!("event=personne_update module=service status=ok personne_id={id}");
        self.get_personne(id)
    }

    pub fn delete_personne(&self, id: PersonneId) -> Result<(), PersonneServiceError> {
        self.repo.delete_personne(id)?;
        info!("event=personne_delete module=service status=ok personne_id={id}");
        Ok(())
    }

    /// Replaces the devices assigned to `id` with `appareils`.
    ///
    /// An empty slice clears every assignment.
    pub fn affect_appareils(
        &self,
        id: PersonneId,
        appareils: &[AppareilId],
    ) -> Result<Personne, PersonneServiceError> {
        let mut unique = BTreeSet::new();
        for appareil_id in appareils {
            unique.insert(positive_id("appareil_id", *appareil_id)?);
        }
        let normalized = unique.into_iter().collect::<Vec<_>>();

        self.repo.set_personne_appareils(id, &normalized)?;
        info!(
            "event=personne_affect module=service status=ok personne_id={} appareil_count={}",
            id,
            normalized.len()
        );
        self.get_personne(id)
    }
}
