//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Hold rules that span entities (attachment target category, owning
//!   device existence, re-assignment tracking).
//! - Keep the web tier decoupled from storage details.

pub mod appareil_service;
pub mod peripherique_service;
pub mod personne_service;
