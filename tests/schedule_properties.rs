//! Property-based tests over the time arithmetic and rule engine.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use shiftboard::api::{
    Branch, Employee, EmployeeId, EmployeeStatus, EmploymentType, RoleConfig, Shift, ShiftId,
    ShiftStatus,
};
use shiftboard::models::time::{duration_hours, duration_seconds, ClockTime};
use shiftboard::rules::{self, ConflictKind, Severity, ShiftCandidate};
use shiftboard::state::WeekSnapshot;

fn week_sunday() -> NaiveDate {
    "2025-03-02".parse().unwrap()
}

fn test_branch() -> Branch {
    let mut branch = Branch::new("Main", "Downtown");
    branch.roles = vec![RoleConfig {
        name: "Server".to_string(),
        count: 10,
        hourly_rate: 80.0,
        color: None,
    }];
    branch
}

fn test_employee(branch: &Branch) -> Employee {
    Employee {
        id: EmployeeId::new("e1"),
        first_name: "Ana".to_string(),
        last_name: "Garcia".to_string(),
        email: "ana@example.com".to_string(),
        phone: None,
        role: "Server".to_string(),
        branch_id: branch.id.clone(),
        employment_type: EmploymentType::Regular,
        hours_per_week: 40,
        rate: 80.0,
        status: EmployeeStatus::Active,
    }
}

fn materialize(employee: &Employee, candidate: &ShiftCandidate) -> Shift {
    Shift {
        id: ShiftId::generate(),
        employee_id: employee.id.clone(),
        employee_name: employee.full_name(),
        role: candidate.role.clone(),
        branch_id: employee.branch_id.clone(),
        branch_name: "Main".to_string(),
        branch_location: "Downtown".to_string(),
        date: candidate.date,
        start_time: candidate.start_time,
        end_time: candidate.end_time,
        status: ShiftStatus::Scheduled,
        duration: duration_seconds(candidate.start_time, candidate.end_time),
        from_branch_id: None,
        from_branch_name: None,
    }
}

/// The blocking decision the coordinator applies at assignment time.
fn blocks(conflicts: &[rules::Conflict]) -> bool {
    conflicts
        .iter()
        .any(|c| c.severity == Severity::Error || c.kind == ConflictKind::WeeklyCap)
}

proptest! {
    #[test]
    fn duration_is_always_one_to_twentyfour_hours(
        start_hour in 0u8..24,
        start_min in 0u8..60,
        end_hour in 0u8..24,
        end_min in 0u8..60,
    ) {
        let start = ClockTime::new(start_hour, start_min).unwrap();
        let end = ClockTime::new(end_hour, end_min).unwrap();

        let hours = duration_hours(start, end);
        prop_assert!((1..=24).contains(&hours));
        // Pure function: same inputs, same output.
        prop_assert_eq!(hours, duration_hours(start, end));
        prop_assert_eq!(duration_seconds(start, end), hours * 3600);
    }

    #[test]
    fn wrap_duration_complements_forward_duration(
        start_hour in 0u8..24,
        end_hour in 0u8..24,
    ) {
        prop_assume!(start_hour != end_hour);
        let start = ClockTime::on_the_hour(start_hour).unwrap();
        let end = ClockTime::on_the_hour(end_hour).unwrap();

        // A shift and its reversal partition the 24h day.
        let forward = duration_hours(start, end);
        let backward = duration_hours(end, start);
        prop_assert_eq!(forward + backward, 24);
    }

    #[test]
    fn overlap_detection_is_symmetric(
        a_start in 0u8..24,
        a_len in 1u8..10,
        b_start in 0u8..24,
        b_len in 1u8..10,
    ) {
        let branch = test_branch();
        let employee = test_employee(&branch);
        let date: NaiveDate = "2025-03-03".parse().unwrap();

        let make = |start: u8, len: u8| ShiftCandidate {
            role: "Server".to_string(),
            date,
            start_time: ClockTime::on_the_hour(start).unwrap(),
            end_time: ClockTime::on_the_hour((start + len) % 24).unwrap(),
        };
        let a = make(a_start, a_len);
        let b = make(b_start, b_len);

        let a_shift = materialize(&employee, &a);
        let b_shift = materialize(&employee, &b);

        let a_vs_b =
            !rules::overlap_conflicts(&employee, &a, std::slice::from_ref(&b_shift)).is_empty();
        let b_vs_a =
            !rules::overlap_conflicts(&employee, &b, std::slice::from_ref(&a_shift)).is_empty();
        prop_assert_eq!(a_vs_b, b_vs_a);
    }

    #[test]
    fn accepted_sequences_never_violate_invariants(
        ops in prop::collection::vec((0u64..7, 0u8..24, 1u8..10), 0..40),
    ) {
        let branch = test_branch();
        let employee = test_employee(&branch);
        let sunday = week_sunday();

        // Replay the coordinator's accept/reject loop over a random request
        // stream, accumulating only accepted shifts.
        let mut accepted: Vec<Shift> = Vec::new();
        for (day_offset, start_hour, len) in ops {
            let candidate = ShiftCandidate {
                role: "Server".to_string(),
                date: sunday + Days::new(day_offset),
                start_time: ClockTime::on_the_hour(start_hour).unwrap(),
                end_time: ClockTime::on_the_hour((start_hour + len) % 24).unwrap(),
            };
            let conflicts = rules::check_assignment(&employee, &branch, &candidate, &accepted);
            if !blocks(&conflicts) {
                accepted.push(materialize(&employee, &candidate));
            }
        }

        // No two same-day shifts overlap, after any accepted sequence.
        for (i, a) in accepted.iter().enumerate() {
            for b in accepted.iter().skip(i + 1) {
                if a.date == b.date {
                    let disjoint = a.start_time.hour() >= b.end_time.hour()
                        || a.end_time.hour() <= b.start_time.hour();
                    prop_assert!(disjoint, "overlap between {:?} and {:?}", a, b);
                }
            }
        }

        let snapshot = WeekSnapshot::new(sunday, accepted.clone());
        // Regular staff never exceed five distinct days or the weekly cap.
        prop_assert!(snapshot.distinct_days(&employee.id) <= 5);
        prop_assert!(snapshot.total_hours(&employee.id) <= 40);
    }

    #[test]
    fn adding_then_removing_a_shift_restores_snapshot_queries(
        day_offset in 0u64..7,
        start_hour in 0u8..24,
        len in 1u8..10,
    ) {
        let branch = test_branch();
        let employee = test_employee(&branch);
        let sunday = week_sunday();

        let base = vec![materialize(
            &employee,
            &ShiftCandidate {
                role: "Server".to_string(),
                date: sunday,
                start_time: ClockTime::on_the_hour(9).unwrap(),
                end_time: ClockTime::on_the_hour(13).unwrap(),
            },
        )];

        let before = WeekSnapshot::new(sunday, base.clone());
        let hours_before = before.total_hours(&employee.id);
        let days_before = before.distinct_days(&employee.id);

        let extra = materialize(
            &employee,
            &ShiftCandidate {
                role: "Server".to_string(),
                date: sunday + Days::new(day_offset),
                start_time: ClockTime::on_the_hour(start_hour).unwrap(),
                end_time: ClockTime::on_the_hour((start_hour + len) % 24).unwrap(),
            },
        );

        let mut with_extra = base.clone();
        with_extra.push(extra.clone());
        let mut without = with_extra.clone();
        without.retain(|s| s.id != extra.id);

        let after = WeekSnapshot::new(sunday, without);
        prop_assert_eq!(after.total_hours(&employee.id), hours_before);
        prop_assert_eq!(after.distinct_days(&employee.id), days_before);
    }
}
