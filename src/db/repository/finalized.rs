//! Finalization-record repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{EmployeeId, FinalizedSchedule};

/// Repository trait for per-employee-per-week finalization records.
///
/// `week_start` keys are Sunday dates, but `delete_finalized` clears records
/// stored under any day of that week so a drifted key can never strand a
/// finalized lock.
#[async_trait]
pub trait FinalizationRepository: Send + Sync {
    /// Create or re-assert the record for (employee, week).
    async fn upsert_finalized(
        &self,
        employee_id: &EmployeeId,
        week_start: NaiveDate,
    ) -> RepositoryResult<FinalizedSchedule>;

    /// Remove the record(s) for (employee, week). Returns the number of
    /// records removed.
    async fn delete_finalized(
        &self,
        employee_id: &EmployeeId,
        week_start: NaiveDate,
    ) -> RepositoryResult<usize>;

    /// All finalized records for the week starting at `week_start`.
    async fn list_finalized(&self, week_start: NaiveDate)
        -> RepositoryResult<Vec<FinalizedSchedule>>;
}
