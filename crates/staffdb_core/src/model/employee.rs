//! Employee domain model.
//!
//! Employees are the parent side of `reviews.employee_id`; the review
//! repository only needs to know whether one exists.

use super::department::DepartmentId;
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Primary key of an `employees` row.
pub type EmployeeId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// `None` until persisted.
    pub id: Option<EmployeeId>,
    pub name: String,
    pub job_title: String,
    /// Optional, must reference an existing department when set.
    pub department_id: Option<DepartmentId>,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: Option<DepartmentId>,
    ) -> Result<Self, ValidationError> {
        let employee = Self {
            id: None,
            name: name.into(),
            job_title: job_title.into(),
            department_id,
        };
        employee.validate()?;
        Ok(employee)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("job_title", &self.job_title)
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map_or_else(|| "unsaved".to_string(), |id| id.to_string());
        write!(f, "<Employee {id}: {}, {}", self.name, self.job_title)?;
        match self.department_id {
            Some(department_id) => write!(f, ", Department ID: {department_id}>"),
            None => write!(f, ">"),
        }
    }
}
