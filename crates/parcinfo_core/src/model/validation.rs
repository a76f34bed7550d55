//! Field-level validation errors shared by all input models.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Text field exceeds its column budget (in chars).
    FieldTooLong { field: &'static str, max: usize },
    /// Phone number does not look like a phone number.
    InvalidTelephone(String),
    /// Peripheral type text is not part of the fixed catalogue.
    UnknownPeripheriqueType(String),
    /// Identifier is zero or negative.
    InvalidIdentifier { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must not exceed {max} characters")
            }
            Self::InvalidTelephone(value) => write!(f, "invalid telephone `{value}`"),
            Self::UnknownPeripheriqueType(value) => {
                write!(f, "unknown peripherique type `{value}`")
            }
            Self::InvalidIdentifier { field, value } => {
                write!(f, "{field} must be a positive identifier, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and checks it is non-blank and within `max` chars.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    bounded(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trims `value`, mapping blank input to `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            bounded(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

pub(crate) fn positive_id(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::InvalidIdentifier { field, value });
    }
    Ok(value)
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::FieldTooLong { field, max });
    }
    Ok(())
}
