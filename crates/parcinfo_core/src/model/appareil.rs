//! Appareil (managed device) model.
//!
//! # Invariants
//! - `libelle` is trimmed and never blank.
//! - `proprietaires` is sorted ascending and free of duplicates.

use crate::model::personne::PersonneId;
use crate::model::validation::{required_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type AppareilId = i64;

const LIBELLE_MAX_CHARS: usize = 100;

/// Device family. Peripheral attachments target a specific family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppareilCategorie {
    Ordinateur,
    ObjetNomade,
    #[default]
    Autre,
}

impl AppareilCategorie {
    pub const ALL: [AppareilCategorie; 3] = [Self::Ordinateur, Self::ObjetNomade, Self::Autre];

    pub fn as_db(self) -> &'static str {
        match self {
            Self::Ordinateur => "ordinateur",
            Self::ObjetNomade => "objet_nomade",
            Self::Autre => "autre",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "ordinateur" => Some(Self::Ordinateur),
            "objet_nomade" => Some(Self::ObjetNomade),
            "autre" => Some(Self::Autre),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ordinateur => "Ordinateur",
            Self::ObjetNomade => "Objet nomade",
            Self::Autre => "Autre",
        }
    }
}

impl Display for AppareilCategorie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Persisted device with its owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appareil {
    pub id: AppareilId,
    pub libelle: String,
    pub categorie: AppareilCategorie,
    /// Persons this device is assigned to.
    #[serde(default)]
    pub proprietaires: Vec<PersonneId>,
}

/// Create/update payload for a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppareilInput {
    pub libelle: String,
    #[serde(default)]
    pub categorie: AppareilCategorie,
}

impl AppareilInput {
    pub fn new(libelle: impl Into<String>, categorie: AppareilCategorie) -> Self {
        Self {
            libelle: libelle.into(),
            categorie,
        }
    }

    /// Returns a trimmed copy ready for persistence.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            libelle: required_text("libelle", &self.libelle, LIBELLE_MAX_CHARS)?,
            categorie: self.categorie,
        })
    }
}
