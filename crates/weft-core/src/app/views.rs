//! Outward views (DTOs).
//!
//! Tasks are addressed by `code` only; the internal numeric id never appears
//! in anything serialized from here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Task, TaskCode, TaskStatus, User, UserId};
use crate::engine::DependencyStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyView {
    pub code: TaskCode,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub assignee: Option<UserView>,
}

impl DependencyView {
    pub fn new(task: &Task, assignee: Option<UserView>) -> Self {
        Self {
            code: task.code.clone(),
            title: task.title.clone(),
            status: task.status,
            due_date: task.due_date,
            is_completed: task.status.is_completed(),
            assignee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub code: TaskCode,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<UserView>,
    pub creator: Option<UserView>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dependencies: Vec<DependencyView>,
}

/// Task view plus statistics over the viewer's dependency set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: TaskView,
    pub dependencies_stats: DependencyStats,
    pub dependencies_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDependency {
    pub code: TaskCode,
    pub reason: String,
}

/// Result of a batch dependency addition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    pub task: TaskView,
    pub added: Vec<TaskCode>,
    pub skipped: Vec<SkippedDependency>,
    pub errors: Vec<String>,
}

impl DependencyReport {
    /// Nothing skipped, nothing failed.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use chrono::TimeZone;

    #[test]
    fn dependency_view_hides_internal_id() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let task = Task {
            id: TaskId::new(4242),
            code: TaskCode::parse("TSK-ABCDEFGHIJKL").unwrap(),
            title: "ship it".into(),
            description: None,
            status: TaskStatus::Completed,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 9),
            assignee: None,
            creator: UserId::new(1),
            completed_at: Some(now),
            canceled_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(DependencyView::new(&task, None)).unwrap();

        assert_eq!(json["code"], "TSK-ABCDEFGHIJKL");
        assert_eq!(json["due_date"], "2025-03-09");
        assert_eq!(json["is_completed"], true);
        assert!(json["assignee"].is_null());
        assert!(json.get("id").is_none());
        assert!(!json.to_string().contains("4242"));
    }
}
