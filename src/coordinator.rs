//! Orchestration of schedule mutations.
//!
//! The coordinator runs every mutation end to end:
//! validate → apply → persist → broadcast → reconcile-finalization.
//! It is the single boundary that translates rule-engine output into
//! user-facing acceptance or rejection, and the only layer allowed to decide
//! "warn but proceed" versus "block". Requests arrive as explicit tagged
//! types, validated here before anything reaches the rule engine.
//!
//! Mutations are serialized per process: the finalization-tracker lock is
//! held for the whole create/delete path, so rule checks always run against
//! a snapshot no concurrent local writer can invalidate. Remote writers are
//! still possible, which is why the snapshot is re-read immediately before
//! the persist step.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{
    Branch, BranchId, CrossBranchRequest, CrossBranchStatus, Employee, EmployeeId, EmploymentType,
    Shift, ShiftId, ShiftStatus,
};
use crate::broadcast::{Event, EventBus};
use crate::db::repository::{
    BranchRepository, EmployeeRepository, FinalizationRepository, FullRepository, RepositoryError,
    ShiftPatch, ShiftRepository,
};
use crate::finalize::FinalizationTracker;
use crate::models::time::{duration_seconds, ClockTime, TimeFormatError};
use crate::models::week;
use crate::rules::{self, Conflict, ConflictKind, Severity, ShiftCandidate};
use crate::state::WeekSnapshot;

/// How long a cross-branch request stays actionable before the requester
/// falls back to contacting the other branch manually.
pub const CROSS_BRANCH_EXPIRY_SECS: i64 = 5 * 60;

/// Error taxonomy for schedule mutations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Malformed "HH:MM" input: fatal to the operation, never coerced.
    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),

    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    DateFormat { input: String },

    /// Equal start and end would mean a 24h wrap; rejected outright.
    #[error("zero-length shift: start and end are both {time}")]
    ZeroLengthShift { time: ClockTime },

    /// One or more blocking rule violations; carries the full list.
    #[error("assignment rejected with {} conflict(s)", .conflicts.len())]
    Conflict { conflicts: Vec<Conflict> },

    /// Role headcount cap exceeded at creation time.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    #[error("role {role:?} not found in branch configuration")]
    UnknownRole { role: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ScheduleError {
    fn from(err: RepositoryError) -> Self {
        ScheduleError::Repository(err)
    }
}

/// Map a repository lookup failure onto the coordinator's `NotFound`,
/// keeping other store errors intact.
fn required<T>(
    result: Result<T, RepositoryError>,
    entity: &'static str,
    id: impl ToString,
) -> Result<T, ScheduleError> {
    result.map_err(|err| {
        if err.is_not_found() {
            ScheduleError::NotFound {
                entity,
                id: id.to_string(),
            }
        } else {
            ScheduleError::Repository(err)
        }
    })
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to assign a shift. Times and date arrive as raw strings so that
/// malformed input surfaces through the error taxonomy instead of a
/// deserializer error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub employee_id: EmployeeId,
    pub branch_id: BranchId,
    /// YYYY-MM-DD, branch-local.
    pub date: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    /// Defaults to the employee's own role when absent.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteShiftRequest {
    pub shift_id: ShiftId,
}

/// Shift edit: start/end/role/branch only. Employee and date are fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShiftRequest {
    pub shift_id: ShiftId,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub branch_id: BranchId,
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    #[serde(default)]
    pub regular_employees_max_hours_per_week: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEmployeeRequest {
    pub branch_id: BranchId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
    pub employment_type: EmploymentType,
    /// Part-timers only; regular staff always get the branch cap.
    #[serde(default)]
    pub hours_per_week: Option<u32>,
}

/// Outcome of a create request: either a persisted shift, or a pending
/// cross-branch request when the employee belongs elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created { shift: Shift },
    CrossBranchPending { request: CrossBranchRequest },
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct AssignmentCoordinator {
    repo: Arc<dyn FullRepository>,
    bus: EventBus,
    /// One tracker per week, created lazily from persisted records. The lock
    /// also serializes shift mutations within this process.
    trackers: tokio::sync::Mutex<HashMap<NaiveDate, FinalizationTracker>>,
    pending: Mutex<Vec<CrossBranchRequest>>,
}

impl AssignmentCoordinator {
    pub fn new(repo: Arc<dyn FullRepository>, bus: EventBus) -> Self {
        AssignmentCoordinator {
            repo,
            bus,
            trackers: tokio::sync::Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Assign a shift, or open a cross-branch request when the employee's
    /// home branch differs from the target.
    pub async fn create_shift(
        &self,
        request: CreateShiftRequest,
    ) -> Result<CreateOutcome, ScheduleError> {
        let date = parse_date(&request.date)?;
        let start_time: ClockTime = request.start_time.parse()?;
        let end_time: ClockTime = request.end_time.parse()?;
        if start_time == end_time {
            return Err(ScheduleError::ZeroLengthShift { time: start_time });
        }

        let employee = required(
            self.repo.get_employee(&request.employee_id).await,
            "employee",
            &request.employee_id,
        )?;
        let branch = required(
            self.repo.get_branch(&request.branch_id).await,
            "branch",
            &request.branch_id,
        )?;

        if employee.branch_id != branch.id {
            let pending = self
                .open_cross_branch_request(&employee, &branch, date, start_time, end_time)
                .await?;
            return Ok(CreateOutcome::CrossBranchPending { request: pending });
        }

        let mut trackers = self.trackers.lock().await;
        let tracker = self.tracker_entry(&mut trackers, date).await?;

        // Fresh snapshot immediately before persisting, so the checks see
        // everything written up to this point.
        let snapshot = WeekSnapshot::load(self.repo.as_ref(), date).await?;
        let candidate = ShiftCandidate {
            role: request.role.clone().unwrap_or_else(|| employee.role.clone()),
            date,
            start_time,
            end_time,
        };
        let week_shifts = snapshot.shifts_for_employee(&employee.id);
        let conflicts = rules::check_assignment(&employee, &branch, &candidate, &week_shifts);

        // Errors block; the weekly-cap warning is escalated to blocking at
        // this boundary. The part-time days advisory stays advisory.
        let blocking = conflicts
            .iter()
            .any(|c| c.severity == Severity::Error || c.kind == ConflictKind::WeeklyCap);
        if blocking {
            warn!(
                employee = %employee.id,
                date = %date,
                conflicts = conflicts.len(),
                "assignment rejected"
            );
            return Err(ScheduleError::Conflict { conflicts });
        }

        // A finalized employee is locked against further assignment until
        // unfinalized, even when the candidate itself is rule-clean.
        if tracker.is_finalized(&employee.id) {
            return Err(ScheduleError::Conflict {
                conflicts: vec![finalized_conflict(&employee, tracker.week_start())],
            });
        }

        let shift = Shift {
            id: ShiftId::generate(),
            employee_id: employee.id.clone(),
            employee_name: employee.full_name(),
            role: candidate.role.clone(),
            branch_id: branch.id.clone(),
            branch_name: branch.name.clone(),
            branch_location: branch.location.clone(),
            date,
            start_time,
            end_time,
            status: ShiftStatus::Scheduled,
            duration: duration_seconds(start_time, end_time),
            from_branch_id: None,
            from_branch_name: None,
        };

        self.repo.create_shift(&shift).await?;
        info!(shift = %shift.id, employee = %employee.id, date = %date, "shift created");
        self.bus.publish(Event::ShiftAdd(shift.clone()));

        let snapshot = WeekSnapshot::load(self.repo.as_ref(), date).await?;
        tracker
            .reconcile_employee(&employee, &branch, &snapshot, self.repo.as_ref(), &self.bus)
            .await?;

        Ok(CreateOutcome::Created { shift })
    }

    /// Remove a shift. A missing id is reported as `NotFound`, distinct from
    /// a successful delete.
    pub async fn delete_shift(&self, request: DeleteShiftRequest) -> Result<Shift, ScheduleError> {
        let shift = required(
            self.repo.get_shift(&request.shift_id).await,
            "shift",
            &request.shift_id,
        )?;

        let mut trackers = self.trackers.lock().await;
        let tracker = self.tracker_entry(&mut trackers, shift.date).await?;

        self.repo.delete_shift(&shift.id).await?;
        info!(shift = %shift.id, employee = %shift.employee_id, "shift deleted");
        self.bus.publish(Event::ShiftDelete {
            id: shift.id.clone(),
        });

        // Reconcile using the deleted shift's date for the week. The
        // employee or branch may have been removed meanwhile; finalization
        // then has nothing left to maintain.
        if let Ok(employee) = self.repo.get_employee(&shift.employee_id).await {
            if let Ok(branch) = self.repo.get_branch(&employee.branch_id).await {
                let snapshot = WeekSnapshot::load(self.repo.as_ref(), shift.date).await?;
                tracker
                    .reconcile_employee(
                        &employee,
                        &branch,
                        &snapshot,
                        self.repo.as_ref(),
                        &self.bus,
                    )
                    .await?;
            }
        }

        Ok(shift)
    }

    /// Edit a shift's times, role, or branch in place.
    pub async fn update_shift(&self, request: UpdateShiftRequest) -> Result<Shift, ScheduleError> {
        let existing = required(
            self.repo.get_shift(&request.shift_id).await,
            "shift",
            &request.shift_id,
        )?;

        let start_time = match &request.start_time {
            Some(raw) => Some(raw.parse::<ClockTime>()?),
            None => None,
        };
        let end_time = match &request.end_time {
            Some(raw) => Some(raw.parse::<ClockTime>()?),
            None => None,
        };

        let effective_start = start_time.unwrap_or(existing.start_time);
        let effective_end = end_time.unwrap_or(existing.end_time);
        if effective_start == effective_end {
            return Err(ScheduleError::ZeroLengthShift {
                time: effective_start,
            });
        }

        let patch = ShiftPatch {
            start_time,
            end_time,
            role: request.role.clone(),
            branch_id: request.branch_id.clone(),
        };
        let updated = required(
            self.repo.update_shift(&request.shift_id, &patch).await,
            "shift",
            &request.shift_id,
        )?;
        Ok(updated)
    }

    /// Onboard an employee into a branch role, enforcing the role headcount
    /// cap and copying the configured rate.
    pub async fn add_employee(
        &self,
        request: AddEmployeeRequest,
    ) -> Result<Employee, ScheduleError> {
        let branch = required(
            self.repo.get_branch(&request.branch_id).await,
            "branch",
            &request.branch_id,
        )?;

        let role_config = branch
            .role_config(&request.role)
            .ok_or_else(|| ScheduleError::UnknownRole {
                role: request.role.clone(),
            })?
            .clone();

        let current = self
            .repo
            .count_employees_in_role(&branch.id, &role_config.name)
            .await?;
        if current >= role_config.count as usize {
            return Err(ScheduleError::Capacity(format!(
                "Cannot add more employees for role '{}'. Maximum of {} reached.",
                role_config.name, role_config.count
            )));
        }

        let hours_per_week = match request.employment_type {
            EmploymentType::Regular => branch.regular_employees_max_hours_per_week,
            EmploymentType::PartTime => request.hours_per_week.unwrap_or(40),
        };

        let employee = Employee {
            id: EmployeeId::generate(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            // Store the configured casing so later exact role checks match.
            role: role_config.name.clone(),
            branch_id: branch.id.clone(),
            employment_type: request.employment_type,
            hours_per_week,
            rate: role_config.hourly_rate,
            status: crate::api::EmployeeStatus::Active,
        };

        self.repo.add_employee(&employee).await?;
        info!(employee = %employee.id, branch = %branch.id, role = %employee.role, "employee added");
        self.bus.publish(Event::EmployeeAdded {
            branch_id: branch.id.clone(),
            employee: employee.clone(),
        });
        Ok(employee)
    }

    /// Replace a branch's role roster. The store propagates rates to
    /// matching roles and employees; one `role_updated` event is published
    /// per role.
    pub async fn update_roles(
        &self,
        branch_id: &BranchId,
        roles: Vec<crate::api::RoleConfig>,
    ) -> Result<Branch, ScheduleError> {
        let branch = required(
            self.repo.update_branch_roles(branch_id, &roles).await,
            "branch",
            branch_id,
        )?;
        for role in &roles {
            self.bus.publish(Event::RoleUpdated {
                role: role.name.clone(),
                hourly_rate: role.hourly_rate,
            });
        }
        Ok(branch)
    }

    /// Update branch hour-cap settings and notify clients.
    pub async fn update_settings(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<Branch, ScheduleError> {
        let branch = required(
            self.repo
                .update_branch_settings(
                    &request.branch_id,
                    request.max_hours_per_day,
                    request.regular_employees_max_hours_per_week,
                )
                .await,
            "branch",
            &request.branch_id,
        )?;
        self.bus.publish(Event::BranchSettingsUpdated {
            branch: branch.clone(),
        });
        Ok(branch)
    }

    /// Re-read the denormalized employee/branch names on a shift. The
    /// snapshot fields never auto-sync; this is the explicit refresh.
    pub async fn refresh_denormalized(&self, shift_id: &ShiftId) -> Result<Shift, ScheduleError> {
        let mut shift = required(self.repo.get_shift(shift_id).await, "shift", shift_id)?;
        let employee = required(
            self.repo.get_employee(&shift.employee_id).await,
            "employee",
            &shift.employee_id,
        )?;
        let branch = required(
            self.repo.get_branch(&shift.branch_id).await,
            "branch",
            &shift.branch_id,
        )?;

        shift.employee_name = employee.full_name();
        shift.branch_name = branch.name.clone();
        shift.branch_location = branch.location.clone();
        self.repo.replace_shift(&shift).await?;
        Ok(shift)
    }

    /// Whether the employee is finalized for the week containing `anchor`.
    pub async fn is_finalized(
        &self,
        employee_id: &EmployeeId,
        anchor: NaiveDate,
    ) -> Result<bool, ScheduleError> {
        let mut trackers = self.trackers.lock().await;
        let tracker = self.tracker_entry(&mut trackers, anchor).await?;
        Ok(tracker.is_finalized(employee_id))
    }

    /// Manually finalize an employee's week (the schedule-view button).
    pub async fn finalize_employee(
        &self,
        employee_id: &EmployeeId,
        anchor: NaiveDate,
    ) -> Result<crate::api::FinalizedSchedule, ScheduleError> {
        required(
            self.repo.get_employee(employee_id).await,
            "employee",
            employee_id,
        )?;
        let mut trackers = self.trackers.lock().await;
        let tracker = self.tracker_entry(&mut trackers, anchor).await?;
        let week_start = tracker.week_start();

        let record = self.repo.upsert_finalized(employee_id, week_start).await?;
        if tracker.mark_finalized(employee_id) {
            self.bus.publish(Event::FinalizedAdded {
                employee_id: employee_id.clone(),
                week_start,
            });
        }
        Ok(record)
    }

    /// Manually clear an employee's finalized week. A missing record is
    /// `NotFound`.
    pub async fn unfinalize_employee(
        &self,
        employee_id: &EmployeeId,
        anchor: NaiveDate,
    ) -> Result<(), ScheduleError> {
        let mut trackers = self.trackers.lock().await;
        let tracker = self.tracker_entry(&mut trackers, anchor).await?;
        let week_start = tracker.week_start();

        let removed = self.repo.delete_finalized(employee_id, week_start).await?;
        if removed == 0 {
            return Err(ScheduleError::NotFound {
                entity: "finalized record",
                id: format!("{} @ {}", employee_id, week_start),
            });
        }
        tracker.mark_unfinalized(employee_id);
        self.bus.publish(Event::FinalizedDeleted {
            employee_id: employee_id.clone(),
            week_start,
        });
        Ok(())
    }

    /// All cross-branch requests, with expiry re-evaluated against `now`.
    /// Expiry is a deadline compared on poll, not an interrupt.
    pub fn pending_requests(&self, now: chrono::DateTime<Utc>) -> Vec<CrossBranchRequest> {
        let mut pending = self.pending.lock();
        for request in pending.iter_mut() {
            if request.status == CrossBranchStatus::Pending && request.is_expired(now) {
                request.status = CrossBranchStatus::Expired;
            }
        }
        pending.clone()
    }

    async fn open_cross_branch_request(
        &self,
        employee: &Employee,
        target: &Branch,
        date: NaiveDate,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Result<CrossBranchRequest, ScheduleError> {
        let home = required(
            self.repo.get_branch(&employee.branch_id).await,
            "branch",
            &employee.branch_id,
        )?;

        let now = Utc::now();
        let request = CrossBranchRequest {
            id: uuid::Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            employee_name: employee.full_name(),
            from_branch_id: home.id.clone(),
            from_branch_name: home.name.clone(),
            to_branch_id: target.id.clone(),
            date,
            start_time,
            end_time,
            requested_at: now,
            expires_at: now + chrono::Duration::seconds(CROSS_BRANCH_EXPIRY_SECS),
            status: CrossBranchStatus::Pending,
        };
        info!(
            employee = %employee.id,
            from = %home.id,
            to = %target.id,
            "cross-branch request opened"
        );
        self.pending.lock().push(request.clone());
        Ok(request)
    }

    /// Get or lazily load the finalization tracker for the week of `anchor`.
    async fn tracker_entry<'a>(
        &self,
        trackers: &'a mut HashMap<NaiveDate, FinalizationTracker>,
        anchor: NaiveDate,
    ) -> Result<&'a mut FinalizationTracker, ScheduleError> {
        let week_start = week::week_start(anchor);
        match trackers.entry(week_start) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let tracker =
                    FinalizationTracker::load(self.repo.as_ref(), week_start).await?;
                Ok(entry.insert(tracker))
            }
        }
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| ScheduleError::DateFormat {
        input: input.to_string(),
    })
}

fn finalized_conflict(employee: &Employee, week_start: NaiveDate) -> Conflict {
    Conflict {
        kind: ConflictKind::Finalized,
        severity: Severity::Error,
        message: format!(
            "{} is finalized for the week of {} and cannot take new shifts",
            employee.full_name(),
            week_start
        ),
        employee_id: Some(employee.id.clone()),
        shift_id: None,
    }
}
