//! Branch repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Branch, BranchId, RoleConfig};

/// Repository trait for branch storage.
///
/// `update_roles` carries the original system's propagation semantics: the
/// new hourly rates are synced to every branch role with a matching name
/// (case-insensitive) and to every employee holding that role.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// Persist a new branch. Fails with `Validation` when role names collide
    /// case-insensitively.
    async fn create_branch(&self, branch: &Branch) -> RepositoryResult<()>;

    /// All branches, most recently created first.
    async fn list_branches(&self) -> RepositoryResult<Vec<Branch>>;

    async fn get_branch(&self, id: &BranchId) -> RepositoryResult<Branch>;

    async fn delete_branch(&self, id: &BranchId) -> RepositoryResult<()>;

    /// Replace the branch's role roster and propagate hourly rates to
    /// matching roles on other branches and to employees.
    async fn update_branch_roles(
        &self,
        id: &BranchId,
        roles: &[RoleConfig],
    ) -> RepositoryResult<Branch>;

    /// Update hour-cap settings; `None` leaves a field unchanged.
    async fn update_branch_settings(
        &self,
        id: &BranchId,
        max_hours_per_day: Option<u32>,
        regular_employees_max_hours_per_week: Option<u32>,
    ) -> RepositoryResult<Branch>;
}
