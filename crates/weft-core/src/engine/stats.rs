//! StatsCalculator - 依存の完了状況の集計

use serde::Serialize;

use crate::domain::{Task, TaskStatus};

/// Completion statistics over a set of dependencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub canceled: usize,
    pub remaining: usize,
    /// Rounded to two decimals. 100 when there are no dependencies.
    pub completion_percentage: f64,
    pub can_be_completed: bool,
}

impl DependencyStats {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "No dependencies".to_string();
        }
        format!(
            "{} of {} dependencies completed ({} remaining) - {:.0}%",
            self.completed, self.total, self.remaining, self.completion_percentage
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn compute(dependencies: &[Task]) -> DependencyStats {
        let count = |status: TaskStatus| dependencies.iter().filter(|d| d.status == status).count();

        let total = dependencies.len();
        let completed = count(TaskStatus::Completed);
        let completion_percentage = if total == 0 {
            100.0
        } else {
            (completed as f64 / total as f64 * 10_000.0).round() / 100.0
        };

        DependencyStats {
            total,
            completed,
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            canceled: count(TaskStatus::Canceled),
            remaining: total - completed,
            completion_percentage,
            can_be_completed: completed == total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskCode, TaskId, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn deps(statuses: &[TaskStatus]) -> Vec<Task> {
        let now = Utc::now();
        statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| Task {
                id: TaskId::new(i as u64 + 1),
                code: TaskCode::parse(&format!("TSK-{:012}", i + 1)).unwrap(),
                title: format!("dep {i}"),
                description: None,
                status,
                due_date: None,
                assignee: None,
                creator: UserId::new(1),
                completed_at: None,
                canceled_at: None,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    #[test]
    fn no_dependencies_is_fully_complete() {
        let stats = StatsCalculator::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_percentage, 100.0);
        assert!(stats.can_be_completed);
        assert_eq!(stats.summary(), "No dependencies");
    }

    #[test]
    fn half_done() {
        let stats = StatsCalculator::compute(&deps(&[TaskStatus::Completed, TaskStatus::Pending]));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.remaining, 1);
        assert_eq!(stats.completion_percentage, 50.0);
        assert!(!stats.can_be_completed);
        assert_eq!(stats.summary(), "1 of 2 dependencies completed (1 remaining) - 50%");
    }

    #[rstest]
    #[case(&[TaskStatus::Completed, TaskStatus::Pending, TaskStatus::Pending], 33.33)]
    #[case(&[TaskStatus::Completed, TaskStatus::Completed, TaskStatus::Canceled], 66.67)]
    #[case(&[TaskStatus::Completed, TaskStatus::Completed], 100.0)]
    #[case(&[TaskStatus::Canceled], 0.0)]
    fn percentage_is_rounded_to_two_decimals(#[case] statuses: &[TaskStatus], #[case] expected: f64) {
        let stats = StatsCalculator::compute(&deps(statuses));
        assert_eq!(stats.completion_percentage, expected);
    }

    #[test]
    fn canceled_dependency_blocks_completion() {
        let stats = StatsCalculator::compute(&deps(&[TaskStatus::Completed, TaskStatus::Canceled]));
        assert_eq!(stats.canceled, 1);
        assert!(!stats.can_be_completed);
    }
}
