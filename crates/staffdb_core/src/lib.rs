//! Core data layer for the staff database.
//! Departments, employees and their performance reviews over SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::department::{Department, DepartmentId};
pub use model::employee::{Employee, EmployeeId};
pub use model::review::{Review, ReviewId, MIN_REVIEW_YEAR};
pub use model::ValidationError;
pub use repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeLookup, EmployeeRepository, SqliteEmployeeRepository};
pub use repo::identity_map::IdentityMap;
pub use repo::review_repo::{ReviewHandle, ReviewRepository, ReviewRow, SqliteReviewRepository};
pub use repo::{RepoError, RepoResult};
pub use service::review_service::ReviewService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
