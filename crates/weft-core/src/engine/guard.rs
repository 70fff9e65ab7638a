//! StatusTransitionGuard - status 遷移と完了ゲート
//!
//! どの状態からどの状態へも遷移できる。唯一の制約は
//! 「completed にするには全依存が completed であること」。
//!
//! # 副作用
//! - → completed: completed_at = now, canceled_at = None
//! - → canceled: canceled_at = now, completed_at = None
//! - → pending / in_progress: 両方 None

use std::sync::Arc;

use tracing::{debug, warn};

use super::policy::{Action, PolicyDecision};
use crate::domain::{CoreError, Task, TaskStatus};
use crate::ports::Clock;

pub const INCOMPLETE_DEPENDENCIES: &str =
    "Cannot complete task. All dependencies must be completed first";

#[derive(Clone)]
pub struct StatusTransitionGuard {
    clock: Arc<dyn Clock>,
}

impl StatusTransitionGuard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Can `target` be entered given `dependencies` (the unfiltered set)?
    pub fn gate_allows(target: TaskStatus, dependencies: &[Task]) -> bool {
        !target.is_completed() || dependencies.iter().all(|dep| dep.status.is_completed())
    }

    /// Apply `target` to `task`.
    ///
    /// `authorization` comes from the policy; a denial or a closed gate leaves
    /// `task` untouched.
    pub fn transition(
        &self,
        authorization: PolicyDecision,
        task: &mut Task,
        target: TaskStatus,
        dependencies: &[Task],
    ) -> Result<(), CoreError> {
        if !authorization.is_allowed() {
            return Err(CoreError::Forbidden(
                Action::UpdateStatus.denial_message().to_string(),
            ));
        }
        if !Self::gate_allows(target, dependencies) {
            let open = dependencies
                .iter()
                .filter(|dep| !dep.status.is_completed())
                .count();
            warn!(task_code = %task.code, open, "completion blocked by dependencies");
            return Err(CoreError::BusinessRuleViolation(
                INCOMPLETE_DEPENDENCIES.to_string(),
            ));
        }

        let now = self.clock.now();
        match target {
            TaskStatus::Completed => {
                task.completed_at = Some(now);
                task.canceled_at = None;
            }
            TaskStatus::Canceled => {
                task.canceled_at = Some(now);
                task.completed_at = None;
            }
            TaskStatus::Pending | TaskStatus::InProgress => {
                task.completed_at = None;
                task.canceled_at = None;
            }
        }
        debug!(task_code = %task.code, from = %task.status, to = %target, "status transition");
        task.status = target;
        task.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskCode, TaskId, UserId};
    use crate::ports::FixedClock;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 8, 9, 0, 0).unwrap()
    }

    fn task(n: u64, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(n),
            code: TaskCode::parse(&format!("TSK-{n:012}")).unwrap(),
            title: format!("task {n}"),
            description: None,
            status,
            due_date: None,
            assignee: None,
            creator: UserId::new(1),
            completed_at: None,
            canceled_at: None,
            deleted_at: None,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn guard() -> StatusTransitionGuard {
        StatusTransitionGuard::new(Arc::new(FixedClock::new(t0())))
    }

    #[test]
    fn completion_is_blocked_by_open_dependency() {
        let mut subject = task(1, TaskStatus::InProgress);
        let before = subject.clone();
        let deps = [task(2, TaskStatus::Completed), task(3, TaskStatus::Pending)];

        let err = guard()
            .transition(PolicyDecision::Allow, &mut subject, TaskStatus::Completed, &deps)
            .unwrap_err();

        assert_eq!(err, CoreError::BusinessRuleViolation(INCOMPLETE_DEPENDENCIES.into()));
        assert!(err.to_string().contains("dependencies"));
        assert_eq!(subject, before);
    }

    #[test]
    fn completion_sets_timestamp_and_clears_cancel() {
        let mut subject = task(1, TaskStatus::Canceled);
        subject.canceled_at = Some(t0());
        let deps = [task(2, TaskStatus::Completed)];

        guard()
            .transition(PolicyDecision::Allow, &mut subject, TaskStatus::Completed, &deps)
            .unwrap();

        assert_eq!(subject.status, TaskStatus::Completed);
        assert_eq!(subject.completed_at, Some(t0()));
        assert_eq!(subject.canceled_at, None);
    }

    #[test]
    fn cancel_sets_timestamp_and_clears_completion() {
        let mut subject = task(1, TaskStatus::Completed);
        subject.completed_at = Some(t0());

        guard()
            .transition(PolicyDecision::Allow, &mut subject, TaskStatus::Canceled, &[])
            .unwrap();

        assert_eq!(subject.canceled_at, Some(t0()));
        assert_eq!(subject.completed_at, None);
    }

    #[rstest]
    #[case(TaskStatus::Pending)]
    #[case(TaskStatus::InProgress)]
    fn reopening_clears_both_timestamps(#[case] target: TaskStatus) {
        let mut subject = task(1, TaskStatus::Completed);
        subject.completed_at = Some(t0());
        // Open dependencies never block a move away from completed.
        let deps = [task(2, TaskStatus::Pending)];

        guard()
            .transition(PolicyDecision::Allow, &mut subject, target, &deps)
            .unwrap();

        assert_eq!(subject.status, target);
        assert_eq!(subject.completed_at, None);
        assert_eq!(subject.canceled_at, None);
    }

    #[test]
    fn no_dependencies_means_completion_allowed() {
        let mut subject = task(1, TaskStatus::Pending);
        guard()
            .transition(PolicyDecision::Allow, &mut subject, TaskStatus::Completed, &[])
            .unwrap();
        assert_eq!(subject.status, TaskStatus::Completed);
    }

    #[test]
    fn denied_authorization_is_forbidden_and_mutates_nothing() {
        let mut subject = task(1, TaskStatus::Pending);
        let before = subject.clone();

        let err = guard()
            .transition(PolicyDecision::Deny, &mut subject, TaskStatus::InProgress, &[])
            .unwrap_err();

        assert!(matches!(err, CoreError::Forbidden(_)));
        assert_eq!(subject, before);
    }
}
