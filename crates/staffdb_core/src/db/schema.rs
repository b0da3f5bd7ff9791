//! Whole-schema DDL helpers.
//!
//! Each repository owns the DDL of its own table; this module only fixes the
//! order in which they run.

use crate::repo::department_repo::SqliteDepartmentRepository;
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::review_repo::SqliteReviewRepository;
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Creates `departments`, `employees` and `reviews` if they do not exist.
pub fn create_schema(conn: &Connection) -> RepoResult<()> {
    SqliteDepartmentRepository::create_table(conn)?;
    SqliteEmployeeRepository::create_table(conn)?;
    SqliteReviewRepository::create_table(conn)?;
    Ok(())
}

/// Drops all entity tables, children first. Missing tables are ignored.
pub fn drop_schema(conn: &Connection) -> RepoResult<()> {
    SqliteReviewRepository::drop_table(conn)?;
    SqliteEmployeeRepository::drop_table(conn)?;
    SqliteDepartmentRepository::drop_table(conn)?;
    Ok(())
}
