//! Per-week finalization tracking.
//!
//! An employee's week flips to `finalized` when their scheduled hours reach
//! their effective weekly cap, and back when the condition stops holding.
//! The tracker reconciles its in-memory view against the persisted
//! finalization records after every shift mutation for the week.
//!
//! Reconciliation is gated behind the initial record load: until the first
//! snapshot of a week has been read the tracker refuses to flip anything, so
//! a client loading a week never sees spurious finalize/unfinalize churn on
//! mount.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::api::{Branch, Employee, EmployeeId};
use crate::broadcast::{Event, EventBus};
use crate::db::repository::{FinalizationRepository, RepositoryResult};
use crate::models::week;
use crate::state::WeekSnapshot;

/// Outcome of a reconciliation pass for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizationChange {
    Finalized,
    Unfinalized,
    NoChange,
}

/// Tracks which employees are finalized for one Sunday-aligned week.
#[derive(Debug)]
pub struct FinalizationTracker {
    week_start: NaiveDate,
    finalized: HashSet<EmployeeId>,
    snapshot_loaded: bool,
}

impl FinalizationTracker {
    /// A tracker that has not yet seen the week's records. Reconciliation is
    /// a no-op until [`FinalizationTracker::load`] has run.
    pub fn new(anchor: NaiveDate) -> Self {
        FinalizationTracker {
            week_start: week::week_start(anchor),
            finalized: HashSet::new(),
            snapshot_loaded: false,
        }
    }

    /// Load the persisted finalization records for the week containing
    /// `anchor`, arming the tracker for reconciliation.
    pub async fn load<R: FinalizationRepository + ?Sized>(
        repo: &R,
        anchor: NaiveDate,
    ) -> RepositoryResult<Self> {
        let week_start = week::week_start(anchor);
        let records = repo.list_finalized(week_start).await?;
        Ok(FinalizationTracker {
            week_start,
            finalized: records.into_iter().map(|r| r.employee_id).collect(),
            snapshot_loaded: true,
        })
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot_loaded
    }

    pub fn is_finalized(&self, employee_id: &EmployeeId) -> bool {
        self.finalized.contains(employee_id)
    }

    /// Record a manual finalize (persistence handled by the caller).
    /// Returns false when the employee was already finalized.
    pub fn mark_finalized(&mut self, employee_id: &EmployeeId) -> bool {
        self.finalized.insert(employee_id.clone())
    }

    /// Record a manual unfinalize (persistence handled by the caller).
    /// Returns false when the employee was not finalized.
    pub fn mark_unfinalized(&mut self, employee_id: &EmployeeId) -> bool {
        self.finalized.remove(employee_id)
    }

    /// Re-evaluate one employee against the week snapshot and persist any
    /// state flip.
    ///
    /// Must be called after every shift creation or deletion affecting the
    /// employee/week. Does nothing until the initial record load has run.
    pub async fn reconcile_employee<R: FinalizationRepository + ?Sized>(
        &mut self,
        employee: &Employee,
        branch: &Branch,
        snapshot: &WeekSnapshot,
        repo: &R,
        bus: &EventBus,
    ) -> RepositoryResult<FinalizationChange> {
        if !self.snapshot_loaded {
            return Ok(FinalizationChange::NoChange);
        }

        let total_hours = snapshot.total_hours(&employee.id);
        let has_shifts = !snapshot.shifts_for_employee(&employee.id).is_empty();
        let cap = employee.effective_max_hours(branch);
        // Deleting the last shift always unfinalizes, even for a zero cap.
        let fully_scheduled = has_shifts && total_hours >= cap;
        let currently_finalized = self.finalized.contains(&employee.id);

        if fully_scheduled && !currently_finalized {
            repo.upsert_finalized(&employee.id, self.week_start).await?;
            self.finalized.insert(employee.id.clone());
            tracing::info!(employee = %employee.id, week = %self.week_start, "finalized");
            bus.publish(Event::FinalizedAdded {
                employee_id: employee.id.clone(),
                week_start: self.week_start,
            });
            return Ok(FinalizationChange::Finalized);
        }

        if !fully_scheduled && currently_finalized {
            repo.delete_finalized(&employee.id, self.week_start).await?;
            self.finalized.remove(&employee.id);
            tracing::info!(employee = %employee.id, week = %self.week_start, "unfinalized");
            bus.publish(Event::FinalizedDeleted {
                employee_id: employee.id.clone(),
                week_start: self.week_start,
            });
            return Ok(FinalizationChange::Unfinalized);
        }

        Ok(FinalizationChange::NoChange)
    }
}
