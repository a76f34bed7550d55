//! Appareil use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Service layer remains storage-agnostic.

use crate::model::appareil::{Appareil, AppareilCategorie, AppareilId, AppareilInput};
use crate::repo::appareil_repo::{AppareilListQuery, AppareilRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for device CRUD operations.
pub struct AppareilService<R: AppareilRepository> {
    repo: R,
}

impl<R: AppareilRepository> AppareilService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all devices, optionally restricted to one category.
    pub fn list_appareils(&self, categorie: Option<AppareilCategorie>) -> RepoResult<Vec<Appareil>> {
        self.repo.list_appareils(&AppareilListQuery { categorie })
    }

    pub fn get_appareil(&self, id: AppareilId) -> RepoResult<Option<Appareil>> {
        self.repo.get_appareil(id)
    }

    /// Creates a device and returns the stored record.
    pub fn create_appareil(&self, input: &AppareilInput) -> RepoResult<Appareil> {
        let id = self.repo.create_appareil(input)?;
        info!("event=appareil_create module=service status=ok appareil_id={id}");
        self.read_back(id)
    }

    pub fn update_appareil(&self, id: AppareilId, input: &AppareilInput) -> RepoResult<Appareil> {
        self.repo.update_appareil(id, input)?;
        info!("event=appareil_update module=service status=ok appareil_id={id}");
        self.read_back(id)
    }

    /// Deletes a device. Fails with `InUse` while it owns peripherals.
    pub fn delete_appareil(&self, id: AppareilId) -> RepoResult<()> {
        self.repo.delete_appareil(id)?;
        info!("event=appareil_delete module=service status=ok appareil_id={id}");
        Ok(())
    }

    fn read_back(&self, id: AppareilId) -> RepoResult<Appareil> {
        self.repo
            .get_appareil(id)?
            .ok_or_else(|| RepoError::not_found("appareil", id))
    }
}
