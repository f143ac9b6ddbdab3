//! Request lifecycle rules
//!
//! The status workflow is PENDENTE → EM ANDAMENTO → CONCLUIDA/CANCELADA.
//! All transition preconditions live here as a pure function so the backend
//! and the browser front-end enforce the same rules. The backend re-checks
//! them before every write; the front-end uses them to enable/disable
//! controls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::RequestStatus;

/// The mutable slice of a request the lifecycle rules care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestState {
    pub status: RequestStatus,
    pub assignee_id: Option<Uuid>,
    pub execution_date: Option<NaiveDate>,
    pub completion_report: Option<String>,
    /// Whether the request's service type mandates an assignee at completion
    pub requires_staff: bool,
}

impl RequestState {
    /// State of a freshly created request
    pub fn new_pending(requires_staff: bool) -> Self {
        Self {
            status: RequestStatus::Pending,
            assignee_id: None,
            execution_date: None,
            completion_report: None,
            requires_staff,
        }
    }
}

/// Actions that move a request through its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestAction {
    /// Change service type or requester note; only while pending
    Edit,
    /// Set (`Some`) or clear (`None`) the responsible staff member
    Assign(Option<Uuid>),
    /// Close out the request with a report and execution date
    Complete {
        report: String,
        execution_date: NaiveDate,
    },
    /// Soft-cancel; farmers only while pending, staff any time before a
    /// terminal status
    Cancel { by_requester: bool },
}

/// Why a transition was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransitionError {
    #[error("request is no longer pending")]
    NotPending,
    #[error("request already reached a terminal status")]
    Terminal,
    #[error("assignment required before completion")]
    AssignmentRequired,
}

/// Apply a lifecycle action to a request state.
///
/// Returns the updated state, or the reason the action is not permitted.
/// Never mutates its input; callers persist the result only on `Ok`.
pub fn apply(state: &RequestState, action: &RequestAction) -> Result<RequestState, TransitionError> {
    match action {
        RequestAction::Edit => {
            if state.status != RequestStatus::Pending {
                return Err(TransitionError::NotPending);
            }
            // Field changes themselves are the caller's business; the rule
            // only gates whether editing is possible at all.
            Ok(state.clone())
        }
        RequestAction::Assign(assignee) => {
            if state.status.is_terminal() {
                return Err(TransitionError::Terminal);
            }
            let mut next = state.clone();
            next.assignee_id = *assignee;
            if assignee.is_some() {
                next.status = RequestStatus::InProgress;
            }
            // Unassign leaves the status untouched.
            Ok(next)
        }
        RequestAction::Complete {
            report,
            execution_date,
        } => {
            if state.status.is_terminal() {
                return Err(TransitionError::Terminal);
            }
            if state.requires_staff && state.assignee_id.is_none() {
                return Err(TransitionError::AssignmentRequired);
            }
            let mut next = state.clone();
            next.status = RequestStatus::Completed;
            next.execution_date = Some(*execution_date);
            next.completion_report = Some(report.clone());
            Ok(next)
        }
        RequestAction::Cancel { by_requester } => {
            if state.status.is_terminal() {
                return Err(TransitionError::Terminal);
            }
            if *by_requester && state.status != RequestStatus::Pending {
                return Err(TransitionError::NotPending);
            }
            let mut next = state.clone();
            next.status = RequestStatus::Cancelled;
            Ok(next)
        }
    }
}

/// Check the lifecycle invariants on a state.
///
/// `execution_date` is present exactly when the request is completed, and an
/// assignee implies the request has left PENDENTE.
pub fn invariants_hold(state: &RequestState) -> bool {
    let date_ok = state.execution_date.is_some() == (state.status == RequestStatus::Completed);
    let assignee_ok = state.assignee_id.is_none() || state.status != RequestStatus::Pending;
    date_ok && assignee_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(requires_staff: bool) -> RequestState {
        RequestState::new_pending(requires_staff)
    }

    fn staff_id() -> Uuid {
        Uuid::from_u128(5)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_assign_moves_to_in_progress() {
        let next = apply(&pending(true), &RequestAction::Assign(Some(staff_id()))).unwrap();
        assert_eq!(next.status, RequestStatus::InProgress);
        assert_eq!(next.assignee_id, Some(staff_id()));
        assert!(invariants_hold(&next));
    }

    #[test]
    fn test_unassign_keeps_status() {
        let assigned = apply(&pending(true), &RequestAction::Assign(Some(staff_id()))).unwrap();
        let cleared = apply(&assigned, &RequestAction::Assign(None)).unwrap();
        assert_eq!(cleared.status, RequestStatus::InProgress);
        assert_eq!(cleared.assignee_id, None);
    }

    #[test]
    fn test_completion_gate_rejects_unassigned() {
        let action = RequestAction::Complete {
            report: "done".to_string(),
            execution_date: today(),
        };
        assert_eq!(
            apply(&pending(true), &action),
            Err(TransitionError::AssignmentRequired)
        );
    }

    #[test]
    fn test_completion_without_staff_requirement() {
        let action = RequestAction::Complete {
            report: "done".to_string(),
            execution_date: today(),
        };
        let next = apply(&pending(false), &action).unwrap();
        assert_eq!(next.status, RequestStatus::Completed);
        assert_eq!(next.execution_date, Some(today()));
        assert_eq!(next.completion_report.as_deref(), Some("done"));
        assert!(invariants_hold(&next));
    }

    #[test]
    fn test_completion_with_assignee() {
        let assigned = apply(&pending(true), &RequestAction::Assign(Some(staff_id()))).unwrap();
        let next = apply(
            &assigned,
            &RequestAction::Complete {
                report: "done".to_string(),
                execution_date: today(),
            },
        )
        .unwrap();
        assert_eq!(next.status, RequestStatus::Completed);
        assert!(invariants_hold(&next));
    }

    #[test]
    fn test_edit_only_while_pending() {
        assert!(apply(&pending(false), &RequestAction::Edit).is_ok());

        let assigned = apply(&pending(false), &RequestAction::Assign(Some(staff_id()))).unwrap();
        assert_eq!(
            apply(&assigned, &RequestAction::Edit),
            Err(TransitionError::NotPending)
        );
    }

    #[test]
    fn test_requester_cancel_only_while_pending() {
        let cancel = RequestAction::Cancel { by_requester: true };
        let cancelled = apply(&pending(false), &cancel).unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);

        let assigned = apply(&pending(false), &RequestAction::Assign(Some(staff_id()))).unwrap();
        assert_eq!(apply(&assigned, &cancel), Err(TransitionError::NotPending));
    }

    #[test]
    fn test_staff_cancel_before_completion() {
        let cancel = RequestAction::Cancel {
            by_requester: false,
        };
        let assigned = apply(&pending(false), &RequestAction::Assign(Some(staff_id()))).unwrap();
        let cancelled = apply(&assigned, &cancel).unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let done = apply(
            &pending(false),
            &RequestAction::Complete {
                report: "ok".to_string(),
                execution_date: today(),
            },
        )
        .unwrap();

        for action in [
            RequestAction::Edit,
            RequestAction::Assign(Some(staff_id())),
            RequestAction::Assign(None),
            RequestAction::Complete {
                report: "again".to_string(),
                execution_date: today(),
            },
            RequestAction::Cancel { by_requester: false },
        ] {
            let err = apply(&done, &action).unwrap_err();
            assert!(
                matches!(err, TransitionError::Terminal | TransitionError::NotPending),
                "terminal state accepted {:?}",
                action
            );
        }
    }
}
