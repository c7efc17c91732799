//! End-to-end scenarios for the assignment coordinator.
//!
//! These exercise the full validate → persist → broadcast → reconcile
//! pipeline against the in-memory repository.

use std::sync::Arc;

use shiftboard::api::{Branch, BranchId, EmployeeId, EmploymentType, RoleConfig};
use shiftboard::broadcast::{Event, EventBus};
use shiftboard::coordinator::{
    AddEmployeeRequest, AssignmentCoordinator, CreateOutcome, CreateShiftRequest,
    DeleteShiftRequest, ScheduleError, UpdateShiftRequest,
};
use shiftboard::db::repositories::LocalRepository;
use shiftboard::db::repository::{BranchRepository, FinalizationRepository, FullRepository};
use shiftboard::rules::ConflictKind;
use shiftboard::state::WeekSnapshot;

// Week under test: Sunday 2025-03-02 through Saturday 2025-03-08.
const SUNDAY: &str = "2025-03-02";
const MONDAY: &str = "2025-03-03";
const TUESDAY: &str = "2025-03-04";
const WEDNESDAY: &str = "2025-03-05";
const SATURDAY: &str = "2025-03-08";

struct Fixture {
    repo: Arc<LocalRepository>,
    coordinator: AssignmentCoordinator,
    branch: Branch,
}

async fn fixture() -> Fixture {
    let repo = Arc::new(LocalRepository::new());

    let mut branch = Branch::new("Kapitan Pepe 1", "Cabanatuan");
    branch.roles = vec![
        RoleConfig {
            name: "Server".to_string(),
            count: 10,
            hourly_rate: 80.0,
            color: None,
        },
        RoleConfig {
            name: "Cashier".to_string(),
            count: 1,
            hourly_rate: 90.0,
            color: None,
        },
    ];
    repo.create_branch(&branch).await.unwrap();

    let coordinator =
        AssignmentCoordinator::new(repo.clone() as Arc<dyn FullRepository>, EventBus::default());

    Fixture {
        repo,
        coordinator,
        branch,
    }
}

impl Fixture {
    async fn add_employee(
        &self,
        email: &str,
        role: &str,
        employment_type: EmploymentType,
        hours_per_week: Option<u32>,
    ) -> shiftboard::api::Employee {
        self.coordinator
            .add_employee(AddEmployeeRequest {
                branch_id: self.branch.id.clone(),
                first_name: "Ana".to_string(),
                last_name: "Garcia".to_string(),
                email: email.to_string(),
                phone: None,
                role: role.to_string(),
                employment_type,
                hours_per_week,
            })
            .await
            .unwrap()
    }

    fn create_request(
        &self,
        employee_id: &EmployeeId,
        date: &str,
        start: &str,
        end: &str,
    ) -> CreateShiftRequest {
        CreateShiftRequest {
            employee_id: employee_id.clone(),
            branch_id: self.branch.id.clone(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            role: None,
        }
    }

    async fn create(
        &self,
        employee_id: &EmployeeId,
        date: &str,
        start: &str,
        end: &str,
    ) -> Result<shiftboard::api::Shift, ScheduleError> {
        match self
            .coordinator
            .create_shift(self.create_request(employee_id, date, start, end))
            .await?
        {
            CreateOutcome::Created { shift } => Ok(shift),
            CreateOutcome::CrossBranchPending { .. } => {
                panic!("unexpected cross-branch outcome")
            }
        }
    }
}

fn conflict_kinds(err: &ScheduleError) -> Vec<ConflictKind> {
    match err {
        ScheduleError::Conflict { conflicts } => conflicts.iter().map(|c| c.kind).collect(),
        other => panic!("expected conflict error, got {:?}", other),
    }
}

#[tokio::test]
async fn regular_employee_week_finalizes_after_five_full_days() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;
    // Regular staff get the branch cap.
    assert_eq!(emp.hours_per_week, 40);

    let days = [MONDAY, TUESDAY, WEDNESDAY, "2025-03-06", "2025-03-07"];
    for (i, date) in days.iter().enumerate() {
        let shift = fx.create(&emp.id, date, "09:00", "17:00").await.unwrap();
        assert_eq!(shift.duration, 8 * 3600);

        let snapshot = WeekSnapshot::load(fx.repo.as_ref(), date.parse().unwrap())
            .await
            .unwrap();
        assert_eq!(snapshot.total_hours(&emp.id), 8 * (i as u32 + 1));
        assert_eq!(snapshot.distinct_days(&emp.id), i + 1);
    }

    // 40h over 5 days: finalization fires.
    assert!(fx
        .coordinator
        .is_finalized(&emp.id, MONDAY.parse().unwrap())
        .await
        .unwrap());
    let records = fx
        .repo
        .list_finalized(SUNDAY.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].week_start, SUNDAY.parse().unwrap());

    // A sixth day is rejected by the days-per-week check.
    let err = fx
        .create(&emp.id, SATURDAY, "09:00", "13:00")
        .await
        .unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::DaysPerWeek));
}

#[tokio::test]
async fn first_four_days_do_not_finalize() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let shift = fx.create(&emp.id, MONDAY, "09:00", "17:00").await.unwrap();
    assert_eq!(shift.duration_hours(), 8);
    assert!(!fx
        .coordinator
        .is_finalized(&emp.id, MONDAY.parse().unwrap())
        .await
        .unwrap());
}

#[tokio::test]
async fn part_time_weekly_cap_blocks_at_assignment() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("p@example.com", "Server", EmploymentType::PartTime, Some(20))
        .await;

    // 8h Monday, 8h Tuesday: 16 of 20 hours used.
    fx.create(&emp.id, MONDAY, "10:00", "18:00").await.unwrap();
    fx.create(&emp.id, TUESDAY, "09:00", "17:00").await.unwrap();

    // A 6h Wednesday shift would reach 22h: rejected with the weekly-cap
    // conflict even though the rule itself is only a warning.
    let err = fx
        .create(&emp.id, WEDNESDAY, "09:00", "15:00")
        .await
        .unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::WeeklyCap));

    // A 4h shift fits exactly.
    fx.create(&emp.id, WEDNESDAY, "09:00", "13:00").await.unwrap();
    let snapshot = WeekSnapshot::load(fx.repo.as_ref(), MONDAY.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(snapshot.total_hours(&emp.id), 20);
}

#[tokio::test]
async fn role_mismatch_rejected_without_time_conflict() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let mut request = fx.create_request(&emp.id, MONDAY, "09:00", "13:00");
    request.role = Some("Cashier".to_string());
    let err = fx.coordinator.create_shift(request).await.unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::Role));

    // Nothing persisted.
    let snapshot = WeekSnapshot::load(fx.repo.as_ref(), MONDAY.parse().unwrap())
        .await
        .unwrap();
    assert!(snapshot.shifts().is_empty());
}

#[tokio::test]
async fn overlapping_shift_rejected_whole() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    fx.create(&emp.id, MONDAY, "09:00", "13:00").await.unwrap();
    let err = fx
        .create(&emp.id, MONDAY, "11:00", "15:00")
        .await
        .unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::Overlap));

    // Back-to-back is fine.
    fx.create(&emp.id, MONDAY, "13:00", "17:00").await.unwrap();
}

#[tokio::test]
async fn daily_cap_rejected_before_persistence() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    // Branch default cap is 8h; a 10h shift is an error.
    let err = fx
        .create(&emp.id, MONDAY, "09:00", "19:00")
        .await
        .unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::DailyCap));
}

#[tokio::test]
async fn create_then_delete_restores_pre_create_state() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("p@example.com", "Server", EmploymentType::PartTime, Some(8))
        .await;

    let anchor = MONDAY.parse().unwrap();
    let before = WeekSnapshot::load(fx.repo.as_ref(), anchor).await.unwrap();
    let hours_before = before.total_hours(&emp.id);
    let days_before = before.distinct_days(&emp.id);
    let finalized_before = fx.coordinator.is_finalized(&emp.id, anchor).await.unwrap();

    // This single 8h shift hits the 8h cap and finalizes the employee.
    let shift = fx.create(&emp.id, MONDAY, "09:00", "17:00").await.unwrap();
    assert!(fx.coordinator.is_finalized(&emp.id, anchor).await.unwrap());

    fx.coordinator
        .delete_shift(DeleteShiftRequest {
            shift_id: shift.id.clone(),
        })
        .await
        .unwrap();

    let after = WeekSnapshot::load(fx.repo.as_ref(), anchor).await.unwrap();
    assert_eq!(after.total_hours(&emp.id), hours_before);
    assert_eq!(after.distinct_days(&emp.id), days_before);
    assert_eq!(
        fx.coordinator.is_finalized(&emp.id, anchor).await.unwrap(),
        finalized_before
    );
    assert!(fx
        .repo
        .list_finalized(SUNDAY.parse().unwrap())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn deleting_missing_shift_is_not_found() {
    let fx = fixture().await;
    let err = fx
        .coordinator
        .delete_shift(DeleteShiftRequest {
            shift_id: "no-such-shift".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound { entity: "shift", .. }));
}

#[tokio::test]
async fn zero_length_shift_rejected_up_front() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let err = fx
        .create(&emp.id, MONDAY, "09:00", "09:00")
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ZeroLengthShift { .. }));
}

#[tokio::test]
async fn malformed_time_and_date_surface_as_format_errors() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let err = fx
        .create(&emp.id, MONDAY, "9am", "17:00")
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::TimeFormat(_)));

    let err = fx
        .create(&emp.id, "03/03/2025", "09:00", "17:00")
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::DateFormat { .. }));
}

#[tokio::test]
async fn manually_finalized_employee_is_locked() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    fx.coordinator
        .finalize_employee(&emp.id, MONDAY.parse().unwrap())
        .await
        .unwrap();

    // Rule-clean candidate, still rejected by the finalized lock.
    let err = fx
        .create(&emp.id, MONDAY, "09:00", "13:00")
        .await
        .unwrap_err();
    assert!(conflict_kinds(&err).contains(&ConflictKind::Finalized));

    // Unfinalize and the same assignment goes through.
    fx.coordinator
        .unfinalize_employee(&emp.id, MONDAY.parse().unwrap())
        .await
        .unwrap();
    fx.create(&emp.id, MONDAY, "09:00", "13:00").await.unwrap();
}

#[tokio::test]
async fn deleting_a_shift_unfinalizes_a_full_week() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("p@example.com", "Server", EmploymentType::PartTime, Some(16))
        .await;

    let first = fx.create(&emp.id, MONDAY, "09:00", "17:00").await.unwrap();
    fx.create(&emp.id, TUESDAY, "09:00", "17:00").await.unwrap();
    let anchor = MONDAY.parse().unwrap();
    assert!(fx.coordinator.is_finalized(&emp.id, anchor).await.unwrap());

    fx.coordinator
        .delete_shift(DeleteShiftRequest { shift_id: first.id })
        .await
        .unwrap();
    assert!(!fx.coordinator.is_finalized(&emp.id, anchor).await.unwrap());
}

#[tokio::test]
async fn cross_branch_assignment_opens_pending_request() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let other = Branch::new("Kapitan Pepe 2", "Gapan");
    fx.repo.create_branch(&other).await.unwrap();

    let outcome = fx
        .coordinator
        .create_shift(CreateShiftRequest {
            employee_id: emp.id.clone(),
            branch_id: other.id.clone(),
            date: MONDAY.to_string(),
            start_time: "09:00".to_string(),
            end_time: "13:00".to_string(),
            role: None,
        })
        .await
        .unwrap();

    let request = match outcome {
        CreateOutcome::CrossBranchPending { request } => request,
        CreateOutcome::Created { .. } => panic!("expected cross-branch routing"),
    };
    assert_eq!(request.from_branch_id, fx.branch.id);
    assert_eq!(request.to_branch_id, other.id);

    // No shift was created in either branch.
    let snapshot = WeekSnapshot::load(fx.repo.as_ref(), MONDAY.parse().unwrap())
        .await
        .unwrap();
    assert!(snapshot.shifts().is_empty());

    // Pending now; expired once the five-minute deadline passes.
    let pending = fx.coordinator.pending_requests(request.requested_at);
    assert_eq!(
        pending[0].status,
        shiftboard::api::CrossBranchStatus::Pending
    );
    let later = request.requested_at + chrono::Duration::minutes(6);
    let pending = fx.coordinator.pending_requests(later);
    assert_eq!(
        pending[0].status,
        shiftboard::api::CrossBranchStatus::Expired
    );
}

#[tokio::test]
async fn headcount_cap_enforced_on_onboarding() {
    let fx = fixture().await;

    // Cashier role has a headcount of one.
    fx.add_employee("c1@example.com", "cashier", EmploymentType::Regular, None)
        .await;
    let err = fx
        .coordinator
        .add_employee(AddEmployeeRequest {
            branch_id: fx.branch.id.clone(),
            first_name: "Pedro".to_string(),
            last_name: "Cruz".to_string(),
            email: "c2@example.com".to_string(),
            phone: None,
            role: "Cashier".to_string(),
            employment_type: EmploymentType::Regular,
            hours_per_week: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Capacity(_)));
}

#[tokio::test]
async fn onboarding_copies_rate_and_normalizes_role_case() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "sErVeR", EmploymentType::Regular, None)
        .await;
    assert_eq!(emp.role, "Server");
    assert_eq!(emp.rate, 80.0);

    let err = fx
        .coordinator
        .add_employee(AddEmployeeRequest {
            branch_id: fx.branch.id.clone(),
            first_name: "Lisa".to_string(),
            last_name: "Wong".to_string(),
            email: "lisa@example.com".to_string(),
            phone: None,
            role: "Dishwasher".to_string(),
            employment_type: EmploymentType::Regular,
            hours_per_week: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownRole { .. }));
}

#[tokio::test]
async fn shift_mutations_broadcast_in_order() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("p@example.com", "Server", EmploymentType::PartTime, Some(4))
        .await;
    let mut rx = fx.coordinator.event_bus().subscribe();

    // One 4h shift reaches the cap: SHIFT_ADD then finalized_added.
    let shift = fx.create(&emp.id, MONDAY, "09:00", "13:00").await.unwrap();
    assert!(matches!(rx.recv().await.unwrap(), Event::ShiftAdd(s) if s.id == shift.id));
    assert!(matches!(
        rx.recv().await.unwrap(),
        Event::FinalizedAdded { employee_id, .. } if employee_id == emp.id
    ));

    // Deleting it: SHIFT_DELETE then finalized_deleted.
    fx.coordinator
        .delete_shift(DeleteShiftRequest {
            shift_id: shift.id.clone(),
        })
        .await
        .unwrap();
    assert!(matches!(
        rx.recv().await.unwrap(),
        Event::ShiftDelete { id } if id == shift.id
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        Event::FinalizedDeleted { employee_id, .. } if employee_id == emp.id
    ));
}

#[tokio::test]
async fn update_shift_edits_times_and_recomputes_duration() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;
    let shift = fx.create(&emp.id, MONDAY, "09:00", "17:00").await.unwrap();

    let updated = fx
        .coordinator
        .update_shift(UpdateShiftRequest {
            shift_id: shift.id.clone(),
            start_time: Some("10:00".to_string()),
            end_time: Some("16:00".to_string()),
            role: None,
            branch_id: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.duration, 6 * 3600);
    // Employee and date are untouched.
    assert_eq!(updated.employee_id, shift.employee_id);
    assert_eq!(updated.date, shift.date);

    let err = fx
        .coordinator
        .update_shift(UpdateShiftRequest {
            shift_id: shift.id,
            start_time: Some("16:00".to_string()),
            end_time: None,
            role: None,
            branch_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ZeroLengthShift { .. }));
}

#[tokio::test]
async fn refresh_denormalized_rereads_names() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;
    let shift = fx.create(&emp.id, MONDAY, "09:00", "17:00").await.unwrap();
    assert_eq!(shift.branch_name, "Kapitan Pepe 1");

    // Snapshot fields do not auto-sync; the explicit refresh re-reads them.
    fx.repo
        .update_branch_settings(&fx.branch.id, Some(8), None)
        .await
        .unwrap();
    let refreshed = fx
        .coordinator
        .refresh_denormalized(&shift.id)
        .await
        .unwrap();
    assert_eq!(refreshed.employee_name, "Ana Garcia");
    assert_eq!(refreshed.branch_name, "Kapitan Pepe 1");
}

#[tokio::test]
async fn overnight_shift_counts_wrapped_hours() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let shift = fx.create(&emp.id, MONDAY, "22:00", "02:00").await.unwrap();
    assert_eq!(shift.duration, 4 * 3600);

    let snapshot = WeekSnapshot::load(fx.repo.as_ref(), MONDAY.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(snapshot.total_hours(&emp.id), 4);
}

#[tokio::test]
async fn unknown_branch_is_not_found() {
    let fx = fixture().await;
    let emp = fx
        .add_employee("ana@example.com", "Server", EmploymentType::Regular, None)
        .await;

    let err = fx
        .coordinator
        .create_shift(CreateShiftRequest {
            employee_id: emp.id,
            branch_id: BranchId::new("missing"),
            date: MONDAY.to_string(),
            start_time: "09:00".to_string(),
            end_time: "13:00".to_string(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound { entity: "branch", .. }));
}
