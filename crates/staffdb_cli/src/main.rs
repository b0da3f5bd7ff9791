//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `staffdb_core` end to end against a real SQLite database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `staffdb_cli [DB_PATH | --memory]`. Without an argument the database
//! path comes from `STAFFDB_DB_PATH` (default `company.db`); `--memory` uses a
//! throwaway in-memory database.

use log::error;
use staffdb_core::db::{create_schema, open_db, open_db_in_memory};
use staffdb_core::{
    core_version, init_logging_from_config, CoreConfig, DepartmentRepository,
    EmployeeRepository, ReviewRepository, SqliteDepartmentRepository, SqliteEmployeeRepository,
    SqliteReviewRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::from_env();
    let arg = std::env::args().nth(1);
    init_logging_from_config(&config)?;

    let conn = match arg.as_deref() {
        Some("--memory") => open_db_in_memory()?,
        Some(path) => {
            config.db_path = path.into();
            open_db(&config.db_path)?
        }
        None => open_db(&config.db_path)?,
    };
    create_schema(&conn)?;

    println!("staffdb_core version={}", core_version());

    let department = SqliteDepartmentRepository::new(&conn).create("Payroll", "Building A")?;
    let employee =
        SqliteEmployeeRepository::new(&conn).create("Lee", "Accountant", department.id)?;
    println!("{department}");
    println!("{employee}");

    let employee_id = employee.id.ok_or("employee was not assigned an id")?;
    let mut reviews = SqliteReviewRepository::new(&conn);
    let review = reviews.create(2023, "Closed the books early", employee_id)?;
    println!("{}", review.borrow());

    review.borrow_mut().set_summary("Closed the books two days early")?;
    reviews.update(&review)?;

    for review in reviews.get_all()? {
        println!("{}", review.borrow());
    }
    Ok(())
}
