//! Shift repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::RepositoryResult;
use crate::api::{BranchId, EmployeeId, Shift, ShiftId};
use crate::models::time::ClockTime;

/// Filter for shift listings. All fields are conjunctive; `None` matches
/// everything. Date bounds are inclusive calendar days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftFilter {
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl ShiftFilter {
    pub fn matches(&self, shift: &Shift) -> bool {
        if let Some(ref branch_id) = self.branch_id {
            if shift.branch_id != *branch_id {
                return false;
            }
        }
        if let Some(ref employee_id) = self.employee_id {
            if shift.employee_id != *employee_id {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if shift.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if shift.date > to {
                return false;
            }
        }
        true
    }
}

/// Partial shift update: start/end/role/branch only. Employee and date are
/// fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftPatch {
    #[serde(default)]
    pub start_time: Option<ClockTime>,
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Repository trait for shift storage.
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn create_shift(&self, shift: &Shift) -> RepositoryResult<()>;

    async fn list_shifts(&self, filter: &ShiftFilter) -> RepositoryResult<Vec<Shift>>;

    async fn get_shift(&self, id: &ShiftId) -> RepositoryResult<Shift>;

    /// Delete a shift. Returns `Ok(true)` when a shift was removed and
    /// `Ok(false)` when the id was unknown. Idempotent at this level; the
    /// coordinator surfaces not-found distinctly.
    async fn delete_shift(&self, id: &ShiftId) -> RepositoryResult<bool>;

    /// Apply a patch and return the updated shift. The stored duration is
    /// recomputed when either time changes; a branch change refreshes the
    /// denormalized branch name/location.
    async fn update_shift(&self, id: &ShiftId, patch: &ShiftPatch) -> RepositoryResult<Shift>;

    /// Overwrite an existing shift in place (denormalized-field refresh).
    async fn replace_shift(&self, shift: &Shift) -> RepositoryResult<()>;
}
