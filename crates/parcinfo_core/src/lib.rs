//! Core domain logic for ParcInfo.
//! This crate is the single source of truth for inventory invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::appareil::{Appareil, AppareilCategorie, AppareilId, AppareilInput};
pub use model::peripherique::{
    AttachmentError, NewPeripherique, Peripherique, PeripheriqueId, Rattachement,
    TypePeripherique,
};
pub use model::personne::{Personne, PersonneId, PersonneInput};
pub use model::validation::ValidationError;
pub use repo::appareil_repo::{AppareilListQuery, AppareilRepository, SqliteAppareilRepository};
pub use repo::peripherique_repo::{
    PeripheriqueListQuery, PeripheriqueRepository, SqlitePeripheriqueRepository,
};
pub use repo::personne_repo::{PersonneRepository, SqlitePersonneRepository};
pub use repo::{RepoError, RepoResult};
pub use service::appareil_service::AppareilService;
pub use service::peripherique_service::{
    PeripheriqueService, PeripheriqueServiceError, PeripheriqueUpdate,
};
pub use service::personne_service::{PersonneService, PersonneServiceError};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
