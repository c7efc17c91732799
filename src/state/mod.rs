//! Week-scoped materialized view of the shift collection.
//!
//! A [`WeekSnapshot`] is loaded from the repository immediately before rule
//! checks run, so every check in one assignment attempt sees the same
//! consistent picture. All queries are pure reads over the snapshot; there is
//! no caching beyond it, and no shared mutable arrays hide behind the
//! queries.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::api::{EmployeeId, Shift};
use crate::db::repository::{RepositoryResult, ShiftFilter, ShiftRepository};
use crate::models::week;

/// The shift set for one Sunday-aligned week.
#[derive(Debug, Clone)]
pub struct WeekSnapshot {
    week_start: NaiveDate,
    shifts: Vec<Shift>,
}

impl WeekSnapshot {
    /// Build a snapshot from an already-loaded shift set. Shifts outside the
    /// week of `anchor` are dropped.
    pub fn new(anchor: NaiveDate, shifts: Vec<Shift>) -> Self {
        let week_start = week::week_start(anchor);
        let shifts = shifts
            .into_iter()
            .filter(|s| week::in_week(s.date, week_start))
            .collect();
        WeekSnapshot { week_start, shifts }
    }

    /// Load the full shift set for the week containing `anchor` from the
    /// repository.
    pub async fn load<R: ShiftRepository + ?Sized>(
        repo: &R,
        anchor: NaiveDate,
    ) -> RepositoryResult<Self> {
        let (sunday, saturday) = week::week_bounds(anchor);
        let shifts = repo
            .list_shifts(&ShiftFilter {
                date_from: Some(sunday),
                date_to: Some(saturday),
                ..Default::default()
            })
            .await?;
        Ok(WeekSnapshot {
            week_start: sunday,
            shifts,
        })
    }

    /// The Sunday anchoring this week.
    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// All shifts in the snapshot.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// The employee's shifts for this week.
    pub fn shifts_for_employee(&self, employee_id: &EmployeeId) -> Vec<Shift> {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == *employee_id)
            .cloned()
            .collect()
    }

    /// Total scheduled hours for the employee this week.
    pub fn total_hours(&self, employee_id: &EmployeeId) -> u32 {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == *employee_id)
            .map(|s| s.duration_hours())
            .sum()
    }

    /// Number of distinct calendar days on which the employee has a shift.
    pub fn distinct_days(&self, employee_id: &EmployeeId) -> usize {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == *employee_id)
            .map(|s| s.date)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Every employee with at least one shift this week.
    pub fn employee_ids(&self) -> HashSet<EmployeeId> {
        self.shifts.iter().map(|s| s.employee_id.clone()).collect()
    }
}
