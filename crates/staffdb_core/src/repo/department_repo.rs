//! Department repository and SQLite implementation.

use super::{RepoError, RepoResult};
use crate::model::department::{Department, DepartmentId};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const DEPARTMENT_SELECT_SQL: &str = "SELECT id, name, location FROM departments";

/// Repository interface for department rows.
pub trait DepartmentRepository {
    fn create(&self, name: &str, location: &str) -> RepoResult<Department>;
    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn get_all(&self) -> RepoResult<Vec<Department>>;
    fn delete(&self, id: DepartmentId) -> RepoResult<()>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn create_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY,
                name TEXT,
                location TEXT
            );",
        )?;
        Ok(())
    }

    pub fn drop_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS departments;")?;
        Ok(())
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create(&self, name: &str, location: &str) -> RepoResult<Department> {
        let mut department = Department::new(name, location)?;

        self.conn.execute(
            "INSERT INTO departments (name, location) VALUES (?1, ?2);",
            params![department.name.as_str(), department.location.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        department.id = Some(id);

        info!("event=department_create module=repo status=ok department_id={id}");
        Ok(department)
    }

    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let department = self
            .conn
            .query_row(
                &format!("{DEPARTMENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_department_row,
            )
            .optional()?;

        match department {
            Some(department) => {
                department.validate()?;
                Ok(Some(department))
            }
            None => Ok(None),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEPARTMENT_SELECT_SQL} ORDER BY id;"))?;
        let departments = stmt
            .query_map([], parse_department_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for department in &departments {
            department.validate()?;
        }
        Ok(departments)
    }

    fn delete(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "departments",
                id,
            });
        }

        info!("event=department_delete module=repo status=ok department_id={id}");
        Ok(())
    }
}

fn parse_department_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        location: row.get("location")?,
    })
}
