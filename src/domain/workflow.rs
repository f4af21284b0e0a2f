use chrono::{DateTime, Utc};

use crate::models::onboarding::TaskStatus;

/// Attempted status change that the workflow does not allow.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Workflow fields shared by tasks and milestones.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub status: TaskStatus,
    pub completion_percentage: i32,
    pub completed_date: Option<DateTime<Utc>>,
}

/// pending -> in_progress -> completed, with skipped and blocked reachable
/// from any non-terminal state. Same-state transitions are allowed as
/// idempotent no-ops; everything else is rejected.
pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (TaskStatus::Pending, TaskStatus::InProgress) => true,
        (TaskStatus::InProgress, TaskStatus::Completed) => true,
        (from, TaskStatus::Skipped | TaskStatus::Blocked) => !from.is_terminal(),
        _ => false,
    }
}

/// Applies an explicit status request. Ok(false) means the item was
/// already in the requested state and nothing changed.
pub fn apply_status(
    item: &mut WorkItem,
    to: TaskStatus,
    now: DateTime<Utc>,
) -> Result<bool, InvalidTransition> {
    if item.status == to {
        return Ok(false);
    }
    if !can_transition(item.status, to) {
        return Err(InvalidTransition {
            from: item.status,
            to,
        });
    }
    item.status = to;
    if to == TaskStatus::Completed {
        item.completion_percentage = 100;
        item.completed_date = Some(now);
    }
    Ok(true)
}

/// Force-complete: sets completed/100/now regardless of the current state.
/// Returns false when the item was already completed, in which case the
/// original completed_date is kept and the caller must not append evidence.
pub fn complete(item: &mut WorkItem, now: DateTime<Utc>) -> bool {
    if item.status == TaskStatus::Completed {
        return false;
    }
    item.status = TaskStatus::Completed;
    item.completion_percentage = 100;
    item.completed_date = Some(now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_item() -> WorkItem {
        WorkItem {
            status: TaskStatus::Pending,
            completion_percentage: 0,
            completed_date: None,
        }
    }

    #[test]
    fn happy_path_runs_forward() {
        let mut item = pending_item();
        let now = Utc::now();
        assert_eq!(apply_status(&mut item, TaskStatus::InProgress, now), Ok(true));
        assert_eq!(apply_status(&mut item, TaskStatus::Completed, now), Ok(true));
        assert_eq!(item.completion_percentage, 100);
        assert_eq!(item.completed_date, Some(now));
    }

    #[test]
    fn pending_cannot_jump_straight_to_completed() {
        let mut item = pending_item();
        let err = apply_status(&mut item, TaskStatus::Completed, Utc::now()).unwrap_err();
        assert_eq!(err.from, TaskStatus::Pending);
        assert_eq!(err.to, TaskStatus::Completed);
        assert_eq!(item.status, TaskStatus::Pending);
    }

    #[test]
    fn same_state_is_an_idempotent_no_op() {
        let mut item = pending_item();
        assert_eq!(apply_status(&mut item, TaskStatus::Pending, Utc::now()), Ok(false));
    }

    #[test]
    fn skipped_and_blocked_reachable_from_non_terminal_only() {
        assert!(can_transition(TaskStatus::Pending, TaskStatus::Skipped));
        assert!(can_transition(TaskStatus::Pending, TaskStatus::Blocked));
        assert!(can_transition(TaskStatus::InProgress, TaskStatus::Skipped));
        assert!(can_transition(TaskStatus::InProgress, TaskStatus::Blocked));
        assert!(!can_transition(TaskStatus::Completed, TaskStatus::Skipped));
        assert!(!can_transition(TaskStatus::Skipped, TaskStatus::Blocked));
        assert!(!can_transition(TaskStatus::Blocked, TaskStatus::InProgress));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut item = pending_item();
        let first = Utc::now();
        assert!(complete(&mut item, first));
        let after = item.clone();

        let later = first + chrono::Duration::seconds(90);
        assert!(!complete(&mut item, later));
        assert_eq!(item, after, "second completion must change nothing");
    }

    #[test]
    fn complete_forces_from_blocked() {
        let mut item = WorkItem {
            status: TaskStatus::Blocked,
            completion_percentage: 10,
            completed_date: None,
        };
        assert!(complete(&mut item, Utc::now()));
        assert_eq!(item.status, TaskStatus::Completed);
        assert_eq!(item.completion_percentage, 100);
    }
}
