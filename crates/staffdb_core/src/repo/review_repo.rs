//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `reviews` storage.
//! - Keep exactly one in-memory instance per persisted row through an
//!   identity map owned by the repository.
//!
//! # Invariants
//! - Every cached handle has `id == Some(key)` and a matching row; a handle
//!   whose row is found missing on delete is evicted and detached.
//! - Handles are borrowed with `try_borrow`/`try_borrow_mut`; a handle the
//!   caller is still borrowing yields `HandleBorrowed` and is left unchanged.
//! - Write paths validate attributes and the employee reference before SQL
//!   mutations.
//! - Hydration of a cached key mutates the cached instance in place, so
//!   handles held by callers observe the refreshed values.

use super::employee_repo::{EmployeeLookup, SqliteEmployeeRepository};
use super::identity_map::{IdentityMap, Shared};
use super::{RepoError, RepoResult};
use crate::model::employee::EmployeeId;
use crate::model::review::{Review, ReviewId};
use log::{debug, info};
use rusqlite::{params, Connection, Params, Row};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// Shared handle to a cached review.
///
/// Two handles for the same row compare equal under `Rc::ptr_eq`.
pub type ReviewHandle = Shared<Review>;

/// Raw column values of one `reviews` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: i64,
    pub summary: String,
    pub employee_id: EmployeeId,
}

impl ReviewRow {
    fn from_sql_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            year: row.get("year")?,
            summary: row.get("summary")?,
            employee_id: row.get("employee_id")?,
        })
    }
}

/// Repository interface for review CRUD operations.
pub trait ReviewRepository {
    /// Inserts a new row for an unsaved review and caches the handle.
    fn save(&mut self, review: &ReviewHandle) -> RepoResult<ReviewId>;
    /// Constructs and saves a review in one step.
    fn create(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle>;
    /// Returns the canonical instance for a row, refreshing a cached one.
    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle>;
    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>>;
    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>>;
    /// Writes current attribute values to the review's row.
    fn update(&self, review: &ReviewHandle) -> RepoResult<()>;
    /// Deletes the row, evicts the handle and clears its id.
    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()>;
    fn get_all(&mut self) -> RepoResult<Vec<ReviewHandle>>;
}

/// SQLite-backed review repository.
///
/// The identity map lives as long as the repository; dropping the repository
/// ends the session.
pub struct SqliteReviewRepository<'conn, L = SqliteEmployeeRepository<'conn>> {
    conn: &'conn Connection,
    employees: L,
    identity_map: IdentityMap<Review>,
}

impl<'conn> SqliteReviewRepository<'conn, SqliteEmployeeRepository<'conn>> {
    /// Builds a repository that checks employee references on `conn`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_lookup(conn, SqliteEmployeeRepository::new(conn))
    }

    pub fn create_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INTEGER,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );",
        )?;
        Ok(())
    }

    pub fn drop_table(conn: &Connection) -> RepoResult<()> {
        conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        Ok(())
    }
}

impl<'conn, L: EmployeeLookup> SqliteReviewRepository<'conn, L> {
    /// Builds a repository with a caller-provided employee lookup.
    pub fn with_lookup(conn: &'conn Connection, employees: L) -> Self {
        Self {
            conn,
            employees,
            identity_map: IdentityMap::new(),
        }
    }

    /// Number of rows currently represented in the identity map.
    pub fn cached_len(&self) -> usize {
        self.identity_map.len()
    }

    pub fn employee_lookup(&self) -> &L {
        &self.employees
    }

    /// Returns the cached handle for `id` without touching storage.
    pub fn cached(&self, id: ReviewId) -> Option<ReviewHandle> {
        self.identity_map.get(id)
    }

    fn ensure_employee_exists(&self, employee_id: EmployeeId) -> RepoResult<()> {
        if self.employees.employee_exists(employee_id)? {
            return Ok(());
        }
        Err(RepoError::MissingEmployee(employee_id))
    }

    fn read_handle(review: &ReviewHandle) -> RepoResult<Ref<'_, Review>> {
        review
            .try_borrow()
            .map_err(|_| RepoError::HandleBorrowed(None))
    }

    fn write_handle(
        review: &ReviewHandle,
        id: Option<ReviewId>,
    ) -> RepoResult<RefMut<'_, Review>> {
        review
            .try_borrow_mut()
            .map_err(|_| RepoError::HandleBorrowed(id))
    }

    fn fetch_rows<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<ReviewRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, ReviewRow::from_sql_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn hydrate_all(&mut self, rows: Vec<ReviewRow>) -> RepoResult<Vec<ReviewHandle>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }
}

impl<L: EmployeeLookup> ReviewRepository for SqliteReviewRepository<'_, L> {
    fn save(&mut self, review: &ReviewHandle) -> RepoResult<ReviewId> {
        let mut current = Self::write_handle(review, None)?;
        if let Some(id) = current.id() {
            return Err(RepoError::AlreadyPersisted(id));
        }
        current.validate()?;
        self.ensure_employee_exists(current.employee_id())?;

        self.conn.execute(
            "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
            params![current.year(), current.summary(), current.employee_id()],
        )?;

        let id = self.conn.last_insert_rowid();
        current.set_id(Some(id));
        drop(current);
        self.identity_map.insert(id, Rc::clone(review));

        info!("event=review_save module=repo status=ok review_id={id}");
        Ok(id)
    }

    fn create(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        let review = Rc::new(RefCell::new(Review::new(year, summary, employee_id)?));
        self.save(&review)?;
        Ok(review)
    }

    fn instance_from_db(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle> {
        let fresh = Review::with_id(row.id, row.year, row.summary, row.employee_id)?;

        if let Some(cached) = self.identity_map.get(row.id) {
            Self::write_handle(&cached, Some(row.id))?.assign_fields(fresh);
            debug!(
                "event=review_hydrate module=repo status=ok review_id={} cache=hit",
                row.id
            );
            return Ok(cached);
        }

        let review = Rc::new(RefCell::new(fresh));
        self.identity_map.insert(row.id, Rc::clone(&review));
        debug!(
            "event=review_hydrate module=repo status=ok review_id={} cache=miss",
            row.id
        );
        Ok(review)
    }

    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        let rows = self.fetch_rows(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"), [id])?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(self.instance_from_db(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.fetch_rows(
            &format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1 ORDER BY id;"),
            [employee_id],
        )?;
        self.hydrate_all(rows)
    }

    fn update(&self, review: &ReviewHandle) -> RepoResult<()> {
        let current = Self::read_handle(review)?;
        let id = current.id().ok_or(RepoError::NotPersisted)?;
        current.validate()?;
        self.ensure_employee_exists(current.employee_id())?;

        let changed = self.conn.execute(
            "UPDATE reviews
             SET year = ?1, summary = ?2, employee_id = ?3
             WHERE id = ?4;",
            params![current.year(), current.summary(), current.employee_id(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "reviews",
                id,
            });
        }

        info!("event=review_update module=repo status=ok review_id={id}");
        Ok(())
    }

    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let mut current = Self::write_handle(review, None)?;
        let id = current.id().ok_or(RepoError::NotPersisted)?;

        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;

        self.identity_map.remove(id);
        current.set_id(None);

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "reviews",
                id,
            });
        }

        info!("event=review_delete module=repo status=ok review_id={id}");
        Ok(())
    }

    fn get_all(&mut self) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.fetch_rows(&format!("{REVIEW_SELECT_SQL} ORDER BY id;"), [])?;
        self.hydrate_all(rows)
    }
}
