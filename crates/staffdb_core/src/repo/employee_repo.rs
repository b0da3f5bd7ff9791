//! Employee repository, SQLite implementation and the lookup capability
//! other repositories use to check `employee_id` references.
//!
//! # Invariants
//! - `department_id`, when set, references an existing department before
//!   insert.

use super::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use super::{RepoError, RepoResult};
use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, job_title, department_id FROM employees";

/// Existence check for employee references.
///
/// Only `find_employee` is required; `employee_exists` is derived from it.
pub trait EmployeeLookup {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;

    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        Ok(self.find_employee(id)?.is_some())
    }
}

/// Repository interface for employee rows.
pub trait EmployeeRepository {
    fn create(
        &self,
        name: &str,
        job_title: &str,
        department_id: Option<DepartmentId>,
    ) -> RepoResult<Employee>;
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn get_all(&self) -> RepoResult<Vec<Employee>>;
    fn delete(&self, id: EmployeeId) -> RepoResult<()>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn create_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT,
                job_title TEXT,
                department_id INTEGER,
                FOREIGN KEY (department_id) REFERENCES departments(id)
            );",
        )?;
        Ok(())
    }

    pub fn drop_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS employees;")?;
        Ok(())
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create(
        &self,
        name: &str,
        job_title: &str,
        department_id: Option<DepartmentId>,
    ) -> RepoResult<Employee> {
        let mut employee = Employee::new(name, job_title, department_id)?;

        if let Some(department_id) = department_id {
            let departments = SqliteDepartmentRepository::new(self.conn);
            if departments.find_by_id(department_id)?.is_none() {
                return Err(RepoError::MissingDepartment(department_id));
            }
        }

        self.conn.execute(
            "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3);",
            params![
                employee.name.as_str(),
                employee.job_title.as_str(),
                employee.department_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        employee.id = Some(id);

        info!("event=employee_create module=repo status=ok employee_id={id}");
        Ok(employee)
    }

    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_employee_row,
            )
            .optional()?;

        if let Some(employee) = &employee {
            employee.validate()?;
        }
        Ok(employee)
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id;"))?;
        let employees = stmt
            .query_map([], parse_employee_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for employee in &employees {
            employee.validate()?;
        }
        Ok(employees)
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "employees",
                id,
            });
        }

        info!("event=employee_delete module=repo status=ok employee_id={id}");
        Ok(())
    }
}

impl EmployeeLookup for SqliteEmployeeRepository<'_> {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.find_by_id(id)
    }
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        job_title: row.get("job_title")?,
        department_id: row.get("department_id")?,
    })
}
