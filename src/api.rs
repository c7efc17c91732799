//! Core entity types for the scheduling system.
//!
//! These are the persisted shapes shared by the repository layer, the rule
//! engine, and the HTTP API. All types derive Serialize/Deserialize for JSON
//! serialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::time::{duration_seconds, ClockTime};

/// Branch identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub String);

/// Employee identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

/// Shift identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(pub String);

macro_rules! string_id_impls {
    ($($id:ident),*) => {
        $(
            impl $id {
                pub fn new(value: impl Into<String>) -> Self {
                    $id(value.into())
                }

                /// Generate a fresh random identifier.
                pub fn generate() -> Self {
                    $id(uuid::Uuid::new_v4().to_string())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $id {
                fn from(value: &str) -> Self {
                    $id(value.to_string())
                }
            }
        )*
    };
}

string_id_impls!(BranchId, EmployeeId, ShiftId);

/// A branch-scoped job title with headcount cap and hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    /// Maximum number of employees that may hold this role in the branch.
    pub count: u32,
    pub hourly_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A physical restaurant location with its own role roster and hour caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub roles: Vec<RoleConfig>,
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: u32,
    #[serde(default = "default_regular_weekly_hours")]
    pub regular_employees_max_hours_per_week: u32,
}

fn default_max_hours_per_day() -> u32 {
    8
}

fn default_regular_weekly_hours() -> u32 {
    40
}

impl Branch {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Branch {
            id: BranchId::generate(),
            name: name.into(),
            location: location.into(),
            roles: Vec::new(),
            max_hours_per_day: default_max_hours_per_day(),
            regular_employees_max_hours_per_week: default_regular_weekly_hours(),
        }
    }

    /// Look up a role configuration by name, case-insensitively.
    pub fn role_config(&self, role: &str) -> Option<&RoleConfig> {
        self.roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(role))
    }

    /// Check the invariant that role names are unique within the branch,
    /// ignoring case.
    pub fn roles_are_unique(&self) -> bool {
        let mut seen: Vec<String> = Vec::with_capacity(self.roles.len());
        for role in &self.roles {
            let lowered = role.name.to_lowercase();
            if seen.contains(&lowered) {
                return false;
            }
            seen.push(lowered);
        }
        true
    }
}

/// Employment type determines which weekly-hour cap applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "part-time")]
    PartTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// An employee attached to a home branch.
///
/// `rate` is copied from the matching `RoleConfig` at creation time and
/// re-synced whenever the branch role rate changes. `hours_per_week` is the
/// branch regular cap for regular employees and a custom value for
/// part-timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    pub branch_id: BranchId,
    pub employment_type: EmploymentType,
    pub hours_per_week: u32,
    pub rate: f64,
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The weekly-hour cap that applies to this employee: the branch-wide
    /// regular cap for regular staff, the employee's own figure for
    /// part-timers.
    pub fn effective_max_hours(&self, branch: &Branch) -> u32 {
        match self.employment_type {
            EmploymentType::Regular => branch.regular_employees_max_hours_per_week,
            EmploymentType::PartTime => self.hours_per_week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Scheduled,
    Confirmed,
    Completed,
}

/// A scheduled shift.
///
/// Employee and branch names are snapshots taken at creation time, a
/// historical record of who/where at scheduling time. They do not follow
/// later renames; see `AssignmentCoordinator::refresh_denormalized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub branch_id: BranchId,
    pub branch_name: String,
    #[serde(default)]
    pub branch_location: String,
    /// Branch-local calendar day (YYYY-MM-DD).
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: ShiftStatus,
    /// Derived duration in seconds, overnight-aware.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_branch_id: Option<BranchId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_branch_name: Option<String>,
}

impl Shift {
    /// Shift length in whole hours, recomputed from the stored times.
    pub fn duration_hours(&self) -> u32 {
        crate::models::time::duration_hours(self.start_time, self.end_time)
    }

    /// Recompute the stored duration after a start/end edit.
    pub fn refresh_duration(&mut self) {
        self.duration = duration_seconds(self.start_time, self.end_time);
    }
}

/// Per-employee-per-week completion flag.
///
/// `week_start` is always the Sunday of the week, as a branch-local date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedSchedule {
    pub employee_id: EmployeeId,
    pub week_start: NaiveDate,
    pub finalized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossBranchStatus {
    Pending,
    Expired,
}

/// A proposal to schedule an employee into a branch other than their home
/// branch. Expires five minutes after creation; expiry is checked on poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossBranchRequest {
    pub id: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub from_branch_id: BranchId,
    pub from_branch_name: String,
    pub to_branch_id: BranchId,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub requested_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub status: CrossBranchStatus,
}

impl CrossBranchRequest {
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now >= self.expires_at
    }
}
