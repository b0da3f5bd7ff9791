//! Review domain model.
//!
//! # Responsibility
//! - Hold one performance review and guard its attribute rules.
//!
//! # Invariants
//! - `year >= MIN_REVIEW_YEAR`.
//! - `summary` is never empty.
//! - `employee_id` existence is checked by the repository at write time,
//!   not by the setter.

use super::employee::EmployeeId;
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Primary key of a `reviews` row.
pub type ReviewId = i64;

/// Earliest accepted review year.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// One performance review of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReviewFields")]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl Review {
    /// Creates an unsaved review.
    ///
    /// # Errors
    /// - `YearBeforeMinimum` when `year < MIN_REVIEW_YEAR`.
    /// - `EmptyText` when `summary` is empty.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ValidationError> {
        let mut review = Self {
            id: None,
            year: MIN_REVIEW_YEAR,
            summary: String::new(),
            employee_id,
        };
        review.set_year(year)?;
        review.set_summary(summary)?;
        Ok(review)
    }

    /// Creates a review that already carries a primary key.
    ///
    /// Used when hydrating rows; the id is not checked against storage.
    pub fn with_id(
        id: ReviewId,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ValidationError> {
        let mut review = Self::new(year, summary, employee_id)?;
        review.id = Some(id);
        Ok(review)
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns whether this review is backed by a row.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_year(&mut self, year: i64) -> Result<(), ValidationError> {
        if year < MIN_REVIEW_YEAR {
            return Err(ValidationError::YearBeforeMinimum {
                year,
                minimum: MIN_REVIEW_YEAR,
            });
        }
        self.year = year;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ValidationError> {
        let summary = summary.into();
        require_text("summary", &summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Points the review at another employee.
    ///
    /// Existence is verified on the next `save`/`update`.
    pub fn set_employee_id(&mut self, employee_id: EmployeeId) {
        self.employee_id = employee_id;
    }

    /// Re-checks attribute rules. Fields are private, so this only fails for
    /// values that bypassed the setters (e.g. deserialized input).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.year < MIN_REVIEW_YEAR {
            return Err(ValidationError::YearBeforeMinimum {
                year: self.year,
                minimum: MIN_REVIEW_YEAR,
            });
        }
        require_text("summary", &self.summary)
    }

    pub(crate) fn set_id(&mut self, id: Option<ReviewId>) {
        self.id = id;
    }

    /// Copies attribute values from `other`, keeping this instance's id.
    pub(crate) fn assign_fields(&mut self, other: Review) {
        self.year = other.year;
        self.summary = other.summary;
        self.employee_id = other.employee_id;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Review {id}: ")?,
            None => write!(f, "<Review unsaved: ")?,
        }
        write!(
            f,
            "{}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}

#[derive(Deserialize)]
struct ReviewFields {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl TryFrom<ReviewFields> for Review {
    type Error = ValidationError;

    fn try_from(value: ReviewFields) -> Result<Self, Self::Error> {
        let mut review = Review::new(value.year, value.summary, value.employee_id)?;
        review.id = value.id;
        Ok(review)
    }
}
