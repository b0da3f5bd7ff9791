use rusqlite::Connection;
use staffdb_core::db::{create_schema, open_db_in_memory};
use staffdb_core::{
    DepartmentRepository, EmployeeRepository, RepoError, Review, ReviewRepository, ReviewRow,
    SqliteDepartmentRepository, SqliteEmployeeRepository, SqliteReviewRepository,
    ValidationError,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    create_schema(&conn).unwrap();
    conn
}

fn seed_employee(conn: &Connection) -> i64 {
    let department = SqliteDepartmentRepository::new(conn)
        .create("Payroll", "Building A")
        .unwrap();
    SqliteEmployeeRepository::new(conn)
        .create("Lee", "Accountant", department.id)
        .unwrap()
        .id
        .unwrap()
}

fn stored_summary(conn: &Connection, id: i64) -> Option<String> {
    conn.query_row("SELECT summary FROM reviews WHERE id = ?1;", [id], |row| {
        row.get(0)
    })
    .ok()
}

#[test]
fn create_then_find_returns_same_cached_instance() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let created = repo.create(2021, "Good work", employee_id).unwrap();
    let id = created.borrow().id().unwrap();

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&created, &found));
    let found = found.borrow();
    assert_eq!(found.year(), 2021);
    assert_eq!(found.summary(), "Good work");
    assert_eq!(found.employee_id(), employee_id);
}

#[test]
fn fresh_session_hydrates_equal_values() {
    let conn = setup();
    let employee_id = seed_employee(&conn);

    let id = {
        let mut first = SqliteReviewRepository::new(&conn);
        let created = first.create(2022, "Exceeded targets", employee_id).unwrap();
        let id = created.borrow().id().unwrap();
        id
    };

    let mut second = SqliteReviewRepository::new(&conn);
    assert_eq!(second.cached_len(), 0);
    let found = second.find_by_id(id).unwrap().unwrap();
    assert_eq!(
        *found.borrow(),
        Review::with_id(id, 2022, "Exceeded targets", employee_id).unwrap()
    );
    assert_eq!(second.cached_len(), 1);
}

#[test]
fn save_assigns_id_and_registers_instance() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = Rc::new(RefCell::new(Review::new(2020, "Solid", employee_id).unwrap()));
    assert!(!review.borrow().is_persisted());

    let id = repo.save(&review).unwrap();
    assert_eq!(review.borrow().id(), Some(id));
    assert!(Rc::ptr_eq(&repo.cached(id).unwrap(), &review));
    assert_eq!(stored_summary(&conn, id).as_deref(), Some("Solid"));
}

#[test]
fn save_rejects_already_persisted_instance() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Once", employee_id).unwrap();
    let id = review.borrow().id().unwrap();

    let err = repo.save(&review).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyPersisted(existing) if existing == id));
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn create_rejects_unknown_employee() {
    let conn = setup();
    let mut repo = SqliteReviewRepository::new(&conn);

    let err = repo.create(2021, "Nobody", 404).unwrap_err();
    assert!(matches!(err, RepoError::MissingEmployee(404)));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn create_rejects_invalid_attributes() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let year_err = repo.create(1999, "Too early", employee_id).unwrap_err();
    assert!(matches!(
        year_err,
        RepoError::Validation(ValidationError::YearBeforeMinimum { year: 1999, .. })
    ));

    let summary_err = repo.create(2021, "", employee_id).unwrap_err();
    assert!(matches!(
        summary_err,
        RepoError::Validation(ValidationError::EmptyText { field: "summary" })
    ));
}

#[test]
fn update_writes_mutated_summary() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Draft", employee_id).unwrap();
    let id = review.borrow().id().unwrap();

    review.borrow_mut().set_summary("Final wording").unwrap();
    repo.update(&review).unwrap();

    assert_eq!(stored_summary(&conn, id).as_deref(), Some("Final wording"));
    let refetched = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(refetched.borrow().summary(), "Final wording");
}

#[test]
fn update_checks_new_employee_reference() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Moved", employee_id).unwrap();
    review.borrow_mut().set_employee_id(employee_id + 100);

    let err = repo.update(&review).unwrap_err();
    assert!(matches!(err, RepoError::MissingEmployee(id) if id == employee_id + 100));
}

#[test]
fn update_and_delete_reject_unsaved_instance() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = Rc::new(RefCell::new(Review::new(2021, "Unsaved", employee_id).unwrap()));
    assert!(matches!(repo.update(&review), Err(RepoError::NotPersisted)));
    assert!(matches!(repo.delete(&review), Err(RepoError::NotPersisted)));
}

#[test]
fn update_missing_row_returns_not_found() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let repo = SqliteReviewRepository::new(&conn);

    let review = Rc::new(RefCell::new(
        Review::with_id(77, 2021, "Ghost", employee_id).unwrap(),
    ));
    let err = repo.update(&review).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            table: "reviews",
            id: 77
        }
    ));
}

#[test]
fn delete_removes_row_cache_entry_and_id() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Short-lived", employee_id).unwrap();
    let id = review.borrow().id().unwrap();

    repo.delete(&review).unwrap();

    assert_eq!(review.borrow().id(), None);
    assert!(repo.cached(id).is_none());
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert_eq!(stored_summary(&conn, id), None);
}

#[test]
fn detached_instance_can_be_saved_as_new_row() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Recycled", employee_id).unwrap();
    let old_id = review.borrow().id().unwrap();
    repo.delete(&review).unwrap();

    let new_id = repo.save(&review).unwrap();
    assert_ne!(new_id, old_id);
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn get_all_returns_one_instance_per_row() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let created: Vec<_> = ["first", "second", "third"]
        .iter()
        .map(|summary| repo.create(2021, summary, employee_id).unwrap())
        .collect();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), created.len());
    for (listed, original) in all.iter().zip(&created) {
        assert!(Rc::ptr_eq(listed, original));
    }

    let ids: HashSet<_> = all.iter().map(|review| review.borrow().id()).collect();
    assert_eq!(ids.len(), 3);

    let again = repo.get_all().unwrap();
    assert_eq!(again.len(), 3);
    assert_eq!(repo.cached_len(), 3);
}

#[test]
fn instance_from_db_refreshes_cached_instance_in_place() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let review = repo.create(2021, "Before", employee_id).unwrap();
    let id = review.borrow().id().unwrap();

    conn.execute(
        "UPDATE reviews SET summary = 'Changed elsewhere', year = 2024 WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let refreshed = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&refreshed, &review));
    assert_eq!(review.borrow().summary(), "Changed elsewhere");
    assert_eq!(review.borrow().year(), 2024);
}

#[test]
fn instance_from_db_caches_new_rows_under_their_own_id() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);

    let hydrated = repo
        .instance_from_db(ReviewRow {
            id: 42,
            year: 2023,
            summary: "Imported".to_string(),
            employee_id,
        })
        .unwrap();

    assert_eq!(hydrated.borrow().id(), Some(42));
    assert!(Rc::ptr_eq(&repo.cached(42).unwrap(), &hydrated));
}

#[test]
fn hydration_rejects_invalid_persisted_rows() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (1990, 'Legacy', ?1);",
        [employee_id],
    )
    .unwrap();

    let mut repo = SqliteReviewRepository::new(&conn);
    let err = repo.get_all().unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.cached_len(), 0);
}

#[test]
fn find_by_employee_filters_reviews() {
    let conn = setup();
    let first = seed_employee(&conn);
    let second = SqliteEmployeeRepository::new(&conn)
        .create("Kim", "Analyst", None)
        .unwrap()
        .id
        .unwrap();
    let mut repo = SqliteReviewRepository::new(&conn);

    repo.create(2021, "A1", first).unwrap();
    repo.create(2021, "B1", second).unwrap();
    repo.create(2022, "A2", first).unwrap();

    let summaries: Vec<String> = repo
        .find_by_employee(first)
        .unwrap()
        .iter()
        .map(|review| review.borrow().summary().to_string())
        .collect();
    assert_eq!(summaries, vec!["A1", "A2"]);
}

#[test]
fn foreign_key_blocks_deleting_reviewed_employee() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);
    repo.create(2021, "Keeps employee alive", employee_id).unwrap();

    let err = SqliteEmployeeRepository::new(&conn)
        .delete(employee_id)
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn lookup_while_handle_is_read_returns_error_instead_of_panicking() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);
    let created = repo.create(2021, "Good work", employee_id).unwrap();
    let id = created.borrow().id().unwrap();

    // the `Ref` temporary lives until the end of the statement
    let result = repo.find_by_id(created.borrow().id().unwrap());
    assert!(matches!(result, Err(RepoError::HandleBorrowed(Some(found))) if found == id));

    {
        let view = created.borrow();
        let err = repo.get_all().unwrap_err();
        assert!(matches!(err, RepoError::HandleBorrowed(Some(found)) if found == id));
        assert_eq!(view.summary(), "Good work");
    }

    let found = repo.find_by_id(id).unwrap().unwrap();
    assert!(Rc::ptr_eq(&found, &created));
    assert_eq!(repo.get_all().unwrap().len(), 1);
}

#[test]
fn save_of_borrowed_handle_inserts_nothing() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);
    let review = Rc::new(RefCell::new(Review::new(2021, "Pending", employee_id).unwrap()));

    let view = review.borrow();
    let err = repo.save(&review).unwrap_err();
    assert!(matches!(err, RepoError::HandleBorrowed(None)));
    drop(view);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(review.borrow().id(), None);
    assert_eq!(repo.cached_len(), 0);

    let id = repo.save(&review).unwrap();
    assert_eq!(review.borrow().id(), Some(id));
}

#[test]
fn delete_of_externally_removed_row_evicts_and_detaches() {
    let conn = setup();
    let employee_id = seed_employee(&conn);
    let mut repo = SqliteReviewRepository::new(&conn);
    let review = repo.create(2021, "Gone already", employee_id).unwrap();
    let id = review.borrow().id().unwrap();

    conn.execute("DELETE FROM reviews WHERE id = ?1;", [id]).unwrap();

    let err = repo.delete(&review).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            table: "reviews",
            id: missing
        } if missing == id
    ));
    assert!(repo.cached(id).is_none());
    assert_eq!(review.borrow().id(), None);
    assert_eq!(repo.cached_len(), 0);
}
