//! Pure conflict and eligibility checks for shift assignment.
//!
//! Every function here is side-effect-free: it takes an employee, the branch
//! caps, a candidate shift, and the employee's existing shifts for the
//! relevant week, and returns the conflicts it finds. Nothing in this module
//! decides whether a warning blocks an assignment; that call belongs to the
//! coordinator alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::api::{Branch, Employee, EmployeeId, EmploymentType, Shift, ShiftId};
use crate::models::time::{duration_hours, ClockTime};
use crate::models::week;

/// Hard days-per-week cap for regular employees.
pub const REGULAR_MAX_DAYS_PER_WEEK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    Role,
    Overlap,
    DailyCap,
    WeeklyCap,
    DaysPerWeek,
    Finalized,
}

/// One reason an assignment is questionable or invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<ShiftId>,
}

impl Conflict {
    fn new(kind: ConflictKind, severity: Severity, message: String) -> Self {
        Conflict {
            kind,
            severity,
            message,
            employee_id: None,
            shift_id: None,
        }
    }

    pub fn for_employee(mut self, id: &EmployeeId) -> Self {
        self.employee_id = Some(id.clone());
        self
    }
}

/// A candidate assignment before any shift exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCandidate {
    pub role: String,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl ShiftCandidate {
    pub fn duration_hours(&self) -> u32 {
        duration_hours(self.start_time, self.end_time)
    }
}

/// Run every applicable check and collect the full conflict list.
///
/// `week_shifts` must be the employee's existing shifts for the candidate's
/// Sunday-aligned week, as read from a consistent snapshot. Checks never
/// short-circuit: a caller always sees every reason at once.
pub fn check_assignment(
    employee: &Employee,
    branch: &Branch,
    candidate: &ShiftCandidate,
    week_shifts: &[Shift],
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if let Some(c) = role_conflict(employee, candidate) {
        conflicts.push(c);
    }
    conflicts.extend(overlap_conflicts(employee, candidate, week_shifts));
    if let Some(c) = daily_cap_conflict(branch, candidate) {
        conflicts.push(c.for_employee(&employee.id));
    }
    if let Some(c) = weekly_cap_conflict(employee, branch, candidate, week_shifts) {
        conflicts.push(c);
    }
    if let Some(c) = days_per_week_conflict(employee, branch, candidate, week_shifts) {
        conflicts.push(c);
    }

    conflicts
}

/// Whether any conflict in the list is a hard error.
pub fn has_error(conflicts: &[Conflict]) -> bool {
    conflicts.iter().any(|c| c.severity == Severity::Error)
}

/// Role mismatch: exact, case-sensitive comparison at this layer. Callers
/// normalize case before calling.
pub fn role_conflict(employee: &Employee, candidate: &ShiftCandidate) -> Option<Conflict> {
    if employee.role == candidate.role {
        return None;
    }
    Some(
        Conflict::new(
            ConflictKind::Role,
            Severity::Error,
            format!(
                "{} is a {}, not a {}",
                employee.full_name(),
                employee.role,
                candidate.role
            ),
        )
        .for_employee(&employee.id),
    )
}

/// One error per existing same-day shift whose [start, end) hour interval
/// intersects the candidate's.
pub fn overlap_conflicts(
    employee: &Employee,
    candidate: &ShiftCandidate,
    week_shifts: &[Shift],
) -> Vec<Conflict> {
    let new_start = candidate.start_time.hour();
    let new_end = candidate.end_time.hour();

    week_shifts
        .iter()
        .filter(|shift| shift.date == candidate.date)
        .filter(|shift| {
            let existing_start = shift.start_time.hour();
            let existing_end = shift.end_time.hour();
            new_start < existing_end && new_end > existing_start
        })
        .map(|shift| {
            let mut conflict = Conflict::new(
                ConflictKind::Overlap,
                Severity::Error,
                format!(
                    "{} already has a shift from {} to {}",
                    employee.full_name(),
                    shift.start_time,
                    shift.end_time
                ),
            )
            .for_employee(&employee.id);
            conflict.shift_id = Some(shift.id.clone());
            conflict
        })
        .collect()
}

/// Candidate duration must not exceed the branch's daily cap.
pub fn daily_cap_conflict(branch: &Branch, candidate: &ShiftCandidate) -> Option<Conflict> {
    let duration = candidate.duration_hours();
    if duration <= branch.max_hours_per_day {
        return None;
    }
    Some(Conflict::new(
        ConflictKind::DailyCap,
        Severity::Error,
        format!(
            "Shift exceeds max hours per day ({}h)",
            branch.max_hours_per_day
        ),
    ))
}

/// Weekly-hour cap. A warning here: display callers want the advisory, and
/// the coordinator escalates it to a rejection at assignment time.
pub fn weekly_cap_conflict(
    employee: &Employee,
    branch: &Branch,
    candidate: &ShiftCandidate,
    week_shifts: &[Shift],
) -> Option<Conflict> {
    let max_hours = employee.effective_max_hours(branch);
    let scheduled: u32 = week_shifts.iter().map(|s| s.duration_hours()).sum();
    let projected = scheduled + candidate.duration_hours();

    if projected <= max_hours {
        return None;
    }
    Some(
        Conflict::new(
            ConflictKind::WeeklyCap,
            Severity::Warning,
            format!(
                "{} would exceed max hours ({}/{})",
                employee.full_name(),
                projected,
                max_hours
            ),
        )
        .for_employee(&employee.id),
    )
}

/// Days-per-week cap.
///
/// Regular employees: hard error above five distinct shift days in the
/// Sunday-aligned week. Part-timers: a soft advisory once the distinct-day
/// count reaches `ceil(hours_per_week / max_hours_per_day)` and the
/// candidate lands on a new day. Never blocking.
pub fn days_per_week_conflict(
    employee: &Employee,
    branch: &Branch,
    candidate: &ShiftCandidate,
    week_shifts: &[Shift],
) -> Option<Conflict> {
    let days: HashSet<NaiveDate> = week_shifts
        .iter()
        .filter(|s| week::in_week(s.date, candidate.date))
        .map(|s| s.date)
        .collect();

    match employee.employment_type {
        EmploymentType::Regular => {
            let mut projected = days.clone();
            projected.insert(candidate.date);
            if projected.len() <= REGULAR_MAX_DAYS_PER_WEEK {
                return None;
            }
            Some(
                Conflict::new(
                    ConflictKind::DaysPerWeek,
                    Severity::Error,
                    format!(
                        "{} already has {} shift days this week (max for regular employees)",
                        employee.full_name(),
                        REGULAR_MAX_DAYS_PER_WEEK
                    ),
                )
                .for_employee(&employee.id),
            )
        }
        EmploymentType::PartTime => {
            let max_day = branch.max_hours_per_day.max(1);
            let computed_max_days = employee.hours_per_week.div_ceil(max_day) as usize;
            let is_new_day = !days.contains(&candidate.date);
            if !is_new_day || days.len() < computed_max_days {
                return None;
            }
            Some(
                Conflict::new(
                    ConflictKind::DaysPerWeek,
                    Severity::Warning,
                    format!(
                        "Max days/week reached for this part-timer ({} days/week)",
                        computed_max_days
                    ),
                )
                .for_employee(&employee.id),
            )
        }
    }
}
