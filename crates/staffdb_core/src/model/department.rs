//! Department domain model.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Primary key of a `departments` row.
pub type DepartmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Option<DepartmentId>,
    pub name: String,
    pub location: String,
}

impl Department {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let department = Self {
            id: None,
            name: name.into(),
            location: location.into(),
        };
        department.validate()?;
        Ok(department)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)
    }
}

impl Display for Department {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(f, "<Department {id}: {}, {}>", self.name, self.location)
    }
}
