//! Request lifecycle tests
//!
//! Property-based and unit tests for the status workflow:
//! - execution date is present exactly on completed requests
//! - completion is gated on assignment for staff-requiring services
//! - terminal statuses accept no further actions
//! - list ordering is newest-first with a deterministic tie-break

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use shared::lifecycle::{apply, invariants_hold, RequestAction, RequestState, TransitionError};
use shared::models::{RequestStatus, ServiceRequest};
use shared::resolver::sort_newest_first;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate an arbitrary lifecycle action
fn action_strategy() -> impl Strategy<Value = RequestAction> {
    prop_oneof![
        Just(RequestAction::Edit),
        any::<Option<u64>>().prop_map(|id| RequestAction::Assign(
            id.map(|n| Uuid::from_u128(n as u128 + 1))
        )),
        ("[a-zA-Z ]{1,40}", 0u32..3650u32).prop_map(|(report, offset)| {
            RequestAction::Complete {
                report,
                execution_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                    + chrono::Days::new(offset as u64),
            }
        }),
        any::<bool>().prop_map(|by_requester| RequestAction::Cancel { by_requester }),
    ]
}

/// Generate a random sequence of lifecycle actions
fn action_sequence_strategy() -> impl Strategy<Value = Vec<RequestAction>> {
    prop::collection::vec(action_strategy(), 1..12)
}

fn submission_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u32..3650u32).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(offset as u64)
    })
}

fn request_with(id: u128, submission_date: NaiveDate) -> ServiceRequest {
    ServiceRequest {
        id: Uuid::from_u128(id),
        farmer_id: Uuid::from_u128(1),
        property_id: Uuid::from_u128(2),
        service_type_id: Uuid::from_u128(3),
        vehicle_id: None,
        assignee_id: None,
        status: RequestStatus::Pending,
        submission_date,
        execution_date: None,
        note: None,
        staff_notes: None,
        completion_report: None,
        version: 0,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Any sequence of accepted actions preserves the invariants: a fresh
    /// request stays consistent no matter what order the actions arrive in
    #[test]
    fn prop_accepted_actions_preserve_invariants(
        requires_staff in any::<bool>(),
        actions in action_sequence_strategy(),
    ) {
        let mut state = RequestState::new_pending(requires_staff);
        prop_assert!(invariants_hold(&state));

        for action in &actions {
            if let Ok(next) = apply(&state, action) {
                prop_assert!(
                    invariants_hold(&next),
                    "invariant broken by {:?} from {:?}",
                    action,
                    state
                );
                state = next;
            }
        }
    }

    /// The execution date exists exactly on completed requests, whatever
    /// path the request took
    #[test]
    fn prop_execution_date_iff_completed(
        requires_staff in any::<bool>(),
        actions in action_sequence_strategy(),
    ) {
        let mut state = RequestState::new_pending(requires_staff);
        for action in &actions {
            if let Ok(next) = apply(&state, action) {
                state = next;
            }
        }
        prop_assert_eq!(
            state.execution_date.is_some(),
            state.status == RequestStatus::Completed
        );
    }

    /// Once terminal, every further action is rejected
    #[test]
    fn prop_terminal_states_reject_everything(
        terminal in prop_oneof![
            Just(RequestStatus::Completed),
            Just(RequestStatus::Cancelled),
        ],
        action in action_strategy(),
    ) {
        let state = RequestState {
            status: terminal,
            assignee_id: Some(Uuid::from_u128(9)),
            execution_date: (terminal == RequestStatus::Completed)
                .then(|| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            completion_report: (terminal == RequestStatus::Completed)
                .then(|| "done".to_string()),
            requires_staff: false,
        };
        prop_assert!(apply(&state, &action).is_err());
    }

    /// A staff-requiring request can never complete without an assignee
    #[test]
    fn prop_completion_gate_holds(report in "[a-z]{1,30}") {
        let state = RequestState::new_pending(true);
        let result = apply(&state, &RequestAction::Complete {
            report,
            execution_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        });
        prop_assert_eq!(result, Err(TransitionError::AssignmentRequired));
    }

    /// Sorting is newest-first and deterministic regardless of input order
    #[test]
    fn prop_sort_newest_first_is_canonical(
        mut dates in prop::collection::vec(submission_date_strategy(), 1..20),
    ) {
        let mut requests: Vec<ServiceRequest> = dates
            .drain(..)
            .enumerate()
            .map(|(i, date)| request_with(i as u128 + 1, date))
            .collect();

        let mut reversed: Vec<ServiceRequest> = requests.iter().rev().cloned().collect();

        sort_newest_first(&mut requests);
        sort_newest_first(&mut reversed);

        for window in requests.windows(2) {
            prop_assert!(window[0].submission_date >= window[1].submission_date);
        }
        let ids_a: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        let ids_b: Vec<Uuid> = reversed.iter().map(|r| r.id).collect();
        prop_assert_eq!(ids_a, ids_b);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_happy_path_assign_then_complete() {
    let pending = RequestState::new_pending(true);
    let assigned = apply(&pending, &RequestAction::Assign(Some(Uuid::from_u128(4)))).unwrap();
    assert_eq!(assigned.status, RequestStatus::InProgress);

    let done = apply(
        &assigned,
        &RequestAction::Complete {
            report: "Serviço executado".to_string(),
            execution_date: NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
        },
    )
    .unwrap();
    assert_eq!(done.status, RequestStatus::Completed);
    assert!(done.execution_date.is_some());
    assert!(invariants_hold(&done));
}

#[test]
fn test_unassign_does_not_reopen_editing() {
    let pending = RequestState::new_pending(false);
    let assigned = apply(&pending, &RequestAction::Assign(Some(Uuid::from_u128(4)))).unwrap();
    let cleared = apply(&assigned, &RequestAction::Assign(None)).unwrap();

    assert_eq!(cleared.status, RequestStatus::InProgress);
    assert_eq!(
        apply(&cleared, &RequestAction::Edit),
        Err(TransitionError::NotPending)
    );
}

#[test]
fn test_requester_cannot_cancel_in_progress() {
    let pending = RequestState::new_pending(false);
    let assigned = apply(&pending, &RequestAction::Assign(Some(Uuid::from_u128(4)))).unwrap();

    assert_eq!(
        apply(&assigned, &RequestAction::Cancel { by_requester: true }),
        Err(TransitionError::NotPending)
    );
    let cancelled = apply(
        &assigned,
        &RequestAction::Cancel {
            by_requester: false,
        },
    )
    .unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);
}

#[test]
fn test_sort_example_ordering() {
    let mut requests = vec![
        request_with(1, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
        request_with(2, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
        request_with(3, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()),
    ];
    sort_newest_first(&mut requests);
    let months: Vec<u32> = requests
        .iter()
        .map(|r| {
            use chrono::Datelike;
            r.submission_date.month()
        })
        .collect();
    assert_eq!(months, vec![3, 2, 1]);
}

#[test]
fn test_status_parse_accepts_synonyms() {
    assert_eq!(
        RequestStatus::parse("CONCLUÍDA"),
        Some(RequestStatus::Completed)
    );
    assert_eq!(
        RequestStatus::parse("RECUSADA"),
        Some(RequestStatus::Cancelled)
    );
    assert_eq!(
        RequestStatus::parse(" em andamento "),
        Some(RequestStatus::InProgress)
    );
    assert_eq!(RequestStatus::parse("desconhecido"), None);
}
