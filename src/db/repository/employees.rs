//! Employee repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RepositoryResult;
use crate::api::{BranchId, Employee, EmployeeId};

/// One entry of a bulk hours-per-week update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursUpdate {
    pub employee_id: EmployeeId,
    pub hours_per_week: u32,
}

/// Repository trait for employee storage.
///
/// Headcount caps are enforced by the coordinator, not here; the store only
/// guards structural constraints (unique email, existing ids).
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Persist a new employee. Fails with `Duplicate` when the email is
    /// already taken.
    async fn add_employee(&self, employee: &Employee) -> RepositoryResult<()>;

    async fn list_employees(&self, branch_id: &BranchId) -> RepositoryResult<Vec<Employee>>;

    async fn get_employee(&self, id: &EmployeeId) -> RepositoryResult<Employee>;

    async fn delete_employee(&self, id: &EmployeeId) -> RepositoryResult<()>;

    /// Count employees of a branch holding `role`, case-insensitively.
    async fn count_employees_in_role(
        &self,
        branch_id: &BranchId,
        role: &str,
    ) -> RepositoryResult<usize>;

    /// Apply hours-per-week updates; entries whose employee is missing are
    /// skipped. Returns the employees that were updated.
    async fn bulk_update_hours(&self, updates: &[HoursUpdate]) -> RepositoryResult<Vec<Employee>>;
}
