//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Map entities to rows and back, one repository per table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate attributes and parent references before SQL
//!   mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repository APIs return semantic errors (`NotFound`, `MissingEmployee`)
//!   in addition to DB transport errors.

use crate::db::DbError;
use crate::model::department::DepartmentId;
use crate::model::employee::EmployeeId;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod department_repo;
pub mod employee_repo;
pub mod identity_map;
pub mod review_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// No row with this primary key exists in `table`.
    NotFound { table: &'static str, id: i64 },
    /// Referenced employee does not exist.
    MissingEmployee(EmployeeId),
    /// Referenced department does not exist.
    MissingDepartment(DepartmentId),
    /// Operation needs a persisted instance but `id` is `None`.
    NotPersisted,
    /// `save` called on an instance that already owns a row.
    AlreadyPersisted(i64),
    /// Entity handle is borrowed by the caller, so it cannot be read or
    /// refreshed. Carries the row id when one is known.
    HandleBorrowed(Option<i64>),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "no row with id {id} in {table}"),
            Self::MissingEmployee(id) => write!(f, "employee not found: {id}"),
            Self::MissingDepartment(id) => write!(f, "department not found: {id}"),
            Self::NotPersisted => write!(f, "instance has not been saved"),
            Self::AlreadyPersisted(id) => write!(f, "instance is already saved with id {id}"),
            Self::HandleBorrowed(Some(id)) => write!(f, "handle for id {id} is borrowed"),
            Self::HandleBorrowed(None) => write!(f, "handle is borrowed"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
