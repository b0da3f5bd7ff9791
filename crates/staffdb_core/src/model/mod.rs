//! Domain model for the staff data layer.
//!
//! # Responsibility
//! - Define the in-memory entities mirrored by `departments`, `employees`
//!   and `reviews` rows.
//! - Own attribute validation; repositories only check cross-row references.
//!
//! # Invariants
//! - An entity with `id == None` has never been persisted (or was deleted).
//! - Every constructor and setter rejects values that violate field rules.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod department;
pub mod employee;
pub mod review;

/// Attribute-level validation failure shared by all entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Review year earlier than the supported minimum.
    YearBeforeMinimum { year: i64, minimum: i64 },
    /// Required text field is empty.
    EmptyText { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearBeforeMinimum { year, minimum } => write!(
                f,
                "year must be an integer of value {minimum} or greater, got {year}"
            ),
            Self::EmptyText { field } => write!(f, "{field} must be non-empty text"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyText { field });
    }
    Ok(())
}
