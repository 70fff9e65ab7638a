//! Policy - (actor, resource, action) → allow / deny の一元評価
//!
//! 認可の判断はここだけで行う。Guard / View / TaskService は結果を受け取るだけ。

use crate::domain::{Actor, CoreError, Role, Task};

/// What the actor is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListTasks,
    CreateTask,
    ViewTask,
    UpdateTask,
    UpdateStatus,
    DeleteTask,
    AssignTask,
    ManageDependencies,
    ViewDependencies,
    /// Browse the user directory, e.g. to pick an assignee.
    ListUsers,
}

impl Action {
    /// Message returned to the caller when this action is denied.
    pub fn denial_message(self) -> &'static str {
        match self {
            Action::ViewTask | Action::ViewDependencies => {
                "You do not have permission to view this task"
            }
            Action::UpdateStatus => "You do not have permission to update this task status",
            Action::DeleteTask => "Only managers can delete tasks",
            Action::ListTasks
            | Action::CreateTask
            | Action::UpdateTask
            | Action::AssignTask
            | Action::ManageDependencies
            | Action::ListUsers => {
                "Forbidden. You do not have permission to perform this action"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
}

impl PolicyDecision {
    pub fn is_allowed(self) -> bool {
        self == PolicyDecision::Allow
    }
}

/// Policy は認可ルールの差し替え口
///
/// `task` is `None` for actions that are not about an existing task
/// (listing, creation).
pub trait Policy: Send + Sync {
    fn evaluate(&self, actor: &Actor, task: Option<&Task>, action: Action) -> PolicyDecision;

    /// `evaluate`, turned into a `Forbidden` error on denial.
    fn authorize(&self, actor: &Actor, task: Option<&Task>, action: Action) -> Result<(), CoreError> {
        match self.evaluate(actor, task, action) {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny => Err(CoreError::Forbidden(action.denial_message().to_string())),
        }
    }
}

/// Default two-role policy.
///
/// Manager: everything. Member: may list (the listing is scoped by
/// `PermissionView`), and may view or change the status of tasks assigned to
/// them. The user directory is for managers only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl Policy for RolePolicy {
    fn evaluate(&self, actor: &Actor, task: Option<&Task>, action: Action) -> PolicyDecision {
        match actor.role {
            Role::Manager => PolicyDecision::Allow,
            Role::Member => match action {
                Action::ListTasks => PolicyDecision::Allow,
                Action::ViewTask | Action::ViewDependencies | Action::UpdateStatus => {
                    match task {
                        Some(task) if task.is_assigned_to(actor.user_id) => PolicyDecision::Allow,
                        _ => PolicyDecision::Deny,
                    }
                }
                Action::CreateTask
                | Action::UpdateTask
                | Action::DeleteTask
                | Action::AssignTask
                | Action::ManageDependencies
                | Action::ListUsers => PolicyDecision::Deny,
            },
        }
    }
}
