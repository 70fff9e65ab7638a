//! PermissionView - viewer ごとに見えるタスク・依存の射影
//!
//! Stateless. Never changes edges; it only narrows what is returned.
//! Visibility of an individual task is the policy's `ViewTask` decision, so
//! the rules live in one place.

use std::sync::Arc;

use super::policy::{Action, Policy};
use crate::domain::{Actor, CoreError, Task, TaskFilter};

#[derive(Clone)]
pub struct PermissionView {
    policy: Arc<dyn Policy>,
}

impl PermissionView {
    pub fn new(policy: Arc<dyn Policy>) -> Self {
        Self { policy }
    }

    pub fn can_see(&self, actor: &Actor, task: &Task) -> bool {
        self.policy
            .evaluate(actor, Some(task), Action::ViewTask)
            .is_allowed()
    }

    /// Narrow a listing filter to the actor's scope.
    ///
    /// Members only ever list their own tasks: any assignee they asked for is
    /// replaced by themselves.
    pub fn scope_filter(&self, actor: &Actor, mut filter: TaskFilter) -> TaskFilter {
        if !actor.is_manager() {
            filter.assignee = Some(actor.user_id);
        }
        filter
    }

    /// Keep only the tasks `actor` may see.
    pub fn visible_tasks(&self, actor: &Actor, tasks: Vec<Task>) -> Vec<Task> {
        tasks
            .into_iter()
            .filter(|task| self.can_see(actor, task))
            .collect()
    }

    /// Dependencies of `task` that `actor` may see.
    ///
    /// The task itself must pass the visibility rule first; otherwise the
    /// caller gets `Forbidden` and no dependency data at all.
    pub fn visible_dependencies(
        &self,
        actor: &Actor,
        task: &Task,
        dependencies: Vec<Task>,
    ) -> Result<Vec<Task>, CoreError> {
        self.policy
            .authorize(actor, Some(task), Action::ViewDependencies)?;
        Ok(self.visible_tasks(actor, dependencies))
    }
}
