//! Review use-case service.
//!
//! # Responsibility
//! - Provide review entry points keyed by id for callers that do not hold
//!   handles.
//! - Delegate persistence and caching to a `ReviewRepository`.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::model::employee::EmployeeId;
use crate::model::review::ReviewId;
use crate::repo::review_repo::{ReviewHandle, ReviewRepository};
use crate::repo::{RepoError, RepoResult};

/// Use-case service wrapper for review operations.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a new review for an existing employee.
    pub fn record_review(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        self.repo.create(year, summary, employee_id)
    }

    pub fn get_review(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        self.repo.find_by_id(id)
    }

    /// Replaces the summary of a stored review.
    ///
    /// The in-memory value is restored when validation or the write fails,
    /// so cached handles keep mirroring the row.
    pub fn revise_summary(&mut self, id: ReviewId, summary: &str) -> RepoResult<ReviewHandle> {
        let review = self.require(id)?;
        let previous = review.borrow().summary().to_owned();

        review.borrow_mut().set_summary(summary)?;
        if let Err(err) = self.repo.update(&review) {
            // `previous` came from a valid instance.
            let _ = review.borrow_mut().set_summary(previous);
            return Err(err);
        }
        Ok(review)
    }

    /// Deletes a review by id and returns the detached instance.
    pub fn remove_review(&mut self, id: ReviewId) -> RepoResult<ReviewHandle> {
        let review = self.require(id)?;
        self.repo.delete(&review)?;
        Ok(review)
    }

    pub fn list_reviews(&mut self) -> RepoResult<Vec<ReviewHandle>> {
        self.repo.get_all()
    }

    pub fn reviews_for_employee(
        &mut self,
        employee_id: EmployeeId,
    ) -> RepoResult<Vec<ReviewHandle>> {
        self.repo.find_by_employee(employee_id)
    }

    /// Returns the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn require(&mut self, id: ReviewId) -> RepoResult<ReviewHandle> {
        self.repo.find_by_id(id)?.ok_or(RepoError::NotFound {
            table: "reviews",
            id,
        })
    }
}
