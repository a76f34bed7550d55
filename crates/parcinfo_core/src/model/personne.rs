//! Personne (device holder) model.
//!
//! # Invariants
//! - `nom` and `prenom` are trimmed and never blank.
//! - Optional text fields are `None` rather than empty strings.
//! - `appareils` is sorted ascending and free of duplicates.

use crate::model::appareil::AppareilId;
use crate::model::validation::{optional_text, required_text, ValidationError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type PersonneId = i64;

const NAME_MAX_CHARS: usize = 50;
const ADRESSE_MAX_CHARS: usize = 255;
const TELEPHONE_MAX_CHARS: usize = 20;

static TELEPHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .\-]{5,19}$").expect("valid telephone regex"));

/// Persisted person with the devices assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personne {
    pub id: PersonneId,
    pub nom: String,
    pub prenom: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub date_naissance: Option<NaiveDate>,
    #[serde(default)]
    pub appareils: Vec<AppareilId>,
}

impl Personne {
    /// "Prenom Nom" display form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    pub fn owns(&self, appareil_id: AppareilId) -> bool {
        self.appareils.binary_search(&appareil_id).is_ok()
    }
}

/// Create/update payload for a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonneInput {
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub date_naissance: Option<NaiveDate>,
}

impl PersonneInput {
    pub fn new(nom: impl Into<String>, prenom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            prenom: prenom.into(),
            ..Self::default()
        }
    }

    /// Returns a normalized copy, or the first field-level violation.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let telephone = optional_text("telephone", self.telephone.as_deref(), TELEPHONE_MAX_CHARS)?;
        if let Some(value) = telephone.as_deref() {
            if !TELEPHONE_RE.is_match(value) {
                return Err(ValidationError::InvalidTelephone(value.to_string()));
            }
        }

        Ok(Self {
            nom: required_text("nom", &self.nom, NAME_MAX_CHARS)?,
            prenom: required_text("prenom", &self.prenom, NAME_MAX_CHARS)?,
            adresse: optional_text("adresse", self.adresse.as_deref(), ADRESSE_MAX_CHARS)?,
            telephone,
            date_naissance: self.date_naissance,
        })
    }
}

impl From<&Personne> for PersonneInput {
    fn from(value: &Personne) -> Self {
        Self {
            nom: value.nom.clone(),
            prenom: value.prenom.clone(),
            adresse: value.adresse.clone(),
            telephone: value.telephone.clone(),
            date_naissance: value.date_naissance,
        }
    }
}
