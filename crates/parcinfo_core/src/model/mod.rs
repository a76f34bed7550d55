//! Inventory domain model.
//!
//! # Responsibility
//! - Define the records shared by storage, services and the web tier.
//! - Hold field-level invariants next to the data they constrain.
//!
//! # Invariants
//! - Every persisted record is identified by a positive SQLite row id.
//! - A peripheral is attached to at most one of {ordinateur, objet nomade};
//!   this is encoded in the `Rattachement` type, not checked at runtime.

pub mod appareil;
pub mod peripherique;
pub mod personne;
pub mod validation;
