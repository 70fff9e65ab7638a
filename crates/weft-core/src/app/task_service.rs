//! TaskService - 各オペレーションの組み立て
//!
//! 外部からは code で、内部では TaskId で扱う。変換はこの層だけで行う。
//!
//! # オペレーションの流れ
//! 1. Manager 専用の操作は最初に認可（存在確認より前に 403）
//! 2. code → Task の解決（見つからなければ 404）
//! 3. タスク単位の認可（Policy）
//! 4. Graph / Guard / View / Stats に委譲
//! 5. TaskStore に書き戻して view を返す
//!
//! 書き込み系（update / status / delete / assign）は 2〜5 を
//! `DependencyGraph::write_section` の中で行う。辺の追加とも直列化される。
//!
//! The store is read fresh on every call; the service keeps no task state.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::query::parse_status;
use super::views::{
    DependencyReport, DependencyView, SkippedDependency, TaskDetails, TaskView, UserView,
};
use crate::config::PaginationConfig;
use crate::domain::{
    Actor, CoreError, FieldErrors, NewTask, Page, PageRequest, Task, TaskCode, TaskDraft,
    TaskFilter, TaskId, TaskUpdate, User, UserFilter, UserId,
};
use crate::engine::{Action, PermissionView, Policy, StatsCalculator, StatusTransitionGuard};
use crate::graph::DependencyGraph;
use crate::ports::{Clock, CodeGenerator, StoreError, TaskStore, UserDirectory};

/// Upper bound on code regeneration when the store reports a collision.
const MAX_CODE_ATTEMPTS: usize = 16;
const TITLE_MAX_CHARS: usize = 255;
const SEARCH_MAX_CHARS: usize = 255;

#[derive(Clone)]
pub struct TaskService {
    pub(super) store: Arc<dyn TaskStore>,
    pub(super) users: Arc<dyn UserDirectory>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) codes: Arc<dyn CodeGenerator>,
    pub(super) policy: Arc<dyn Policy>,
    pub(super) graph: DependencyGraph,
    pub(super) guard: StatusTransitionGuard,
    pub(super) view: PermissionView,
    pub(super) pagination: PaginationConfig,
}

impl TaskService {
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Filtered, paginated listing scoped to what `actor` may see.
    pub async fn list_tasks(
        &self,
        actor: &Actor,
        filter: TaskFilter,
        page: PageRequest,
    ) -> Result<Page<TaskView>, CoreError> {
        self.policy.authorize(actor, None, Action::ListTasks)?;
        self.validate_listing(&filter, page)?;

        let filter = self.view.scope_filter(actor, filter);
        let tasks = self.store.list_tasks(&filter, page).await?;
        debug!(actor = %actor.user_id, total = tasks.pagination.total, "tasks listed");

        let mut views = Vec::with_capacity(tasks.items.len());
        for task in &tasks.items {
            views.push(self.task_view(actor, task).await?);
        }
        Ok(Page {
            items: views,
            pagination: tasks.pagination,
        })
    }

    pub async fn create_task(&self, actor: &Actor, new_task: NewTask) -> Result<TaskView, CoreError> {
        self.policy.authorize(actor, None, Action::CreateTask)?;

        let mut fields = FieldErrors::new();
        let title = check_title(Some(&new_task.title), &mut fields);
        if let Some(assignee) = new_task.assignee {
            self.check_assignee("assigned_to", assignee, &mut fields).await?;
        }
        if let Some(err) = CoreError::from_fields(fields) {
            return Err(err);
        }

        let mut draft = TaskDraft {
            code: self.codes.generate(),
            title: title.unwrap_or_default(),
            description: new_task.description,
            due_date: new_task.due_date,
            assignee: new_task.assignee,
            creator: actor.user_id,
            created_at: self.clock.now(),
        };

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            if self.store.code_exists(&draft.code).await? {
                debug!(attempt, code = %draft.code, "task code collision, regenerating");
                draft.code = self.codes.generate();
                continue;
            }
            match self.store.insert_task(draft.clone()).await {
                Ok(task) => {
                    info!(task_code = %task.code, actor = %actor.user_id, "task created");
                    return self.task_view(actor, &task).await;
                }
                Err(StoreError::Conflict(reason)) => {
                    debug!(attempt, %reason, "task code taken concurrently, regenerating");
                    draft.code = self.codes.generate();
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(CoreError::Unexpected(format!(
            "could not allocate a unique task code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// Task view plus stats over the dependencies `actor` may see.
    pub async fn get_task(&self, actor: &Actor, code: &str) -> Result<TaskDetails, CoreError> {
        let task = self.find_task(code).await?;
        self.policy.authorize(actor, Some(&task), Action::ViewTask)?;

        let dependencies = self.graph.dependencies_of(task.id).await?;
        let visible = self.view.visible_dependencies(actor, &task, dependencies)?;
        let stats = StatsCalculator::compute(&visible);

        let view = self.render(&task, &visible).await?;
        Ok(TaskDetails {
            task: view,
            dependencies_summary: stats.summary(),
            dependencies_stats: stats,
        })
    }

    pub async fn update_task(
        &self,
        actor: &Actor,
        code: &str,
        update: TaskUpdate,
    ) -> Result<TaskView, CoreError> {
        self.policy.authorize(actor, None, Action::UpdateTask)?;
        let section = self.graph.write_section().await;
        let mut task = self.find_task(code).await?;
        self.policy.authorize(actor, Some(&task), Action::UpdateTask)?;

        let mut fields = FieldErrors::new();
        let title = check_title(update.title.as_deref(), &mut fields);
        if let Some(Some(assignee)) = update.assignee {
            self.check_assignee("assigned_to", assignee, &mut fields).await?;
        }
        if let Some(err) = CoreError::from_fields(fields) {
            return Err(err);
        }
        if update.is_empty() {
            drop(section);
            return self.task_view(actor, &task).await;
        }

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee) = update.assignee {
            task.assignee = assignee;
        }
        task.updated_at = self.clock.now();
        self.store.save_task(&task).await?;
        drop(section);

        info!(task_code = %task.code, actor = %actor.user_id, "task updated");
        self.task_view(actor, &task).await
    }

    /// Move a task to a new status, subject to the completion gate.
    ///
    /// The gate always sees the full dependency set, whatever `actor` may view.
    /// No edge can be added to the task between the gate decision and the save.
    pub async fn update_status(
        &self,
        actor: &Actor,
        code: &str,
        status: &str,
    ) -> Result<TaskView, CoreError> {
        let target = parse_status(status)?;
        let section = self.graph.write_section().await;
        let mut task = self.find_task(code).await?;

        let decision = self.policy.evaluate(actor, Some(&task), Action::UpdateStatus);
        if !decision.is_allowed() {
            warn!(task_code = %task.code, actor = %actor.user_id, "status update forbidden");
        }
        let dependencies = self.graph.dependencies_of(task.id).await?;
        self.guard
            .transition(decision, &mut task, target, &dependencies)?;
        self.store.save_task(&task).await?;
        drop(section);

        info!(task_code = %task.code, actor = %actor.user_id, status = %target, "task status updated");
        self.task_view(actor, &task).await
    }

    /// Soft delete. Edges touching the task are left in place.
    pub async fn delete_task(&self, actor: &Actor, code: &str) -> Result<(), CoreError> {
        self.policy.authorize(actor, None, Action::DeleteTask)?;
        let _section = self.graph.write_section().await;
        let mut task = self.find_task(code).await?;

        let now = self.clock.now();
        task.deleted_at = Some(now);
        task.updated_at = now;
        self.store.save_task(&task).await?;

        info!(task_code = %task.code, actor = %actor.user_id, "task deleted");
        Ok(())
    }

    pub async fn assign_task(
        &self,
        actor: &Actor,
        code: &str,
        user: UserId,
    ) -> Result<TaskView, CoreError> {
        self.policy.authorize(actor, None, Action::AssignTask)?;
        let section = self.graph.write_section().await;
        let mut task = self.find_task(code).await?;

        if !self.users.user_exists(user).await? {
            return Err(CoreError::invalid_field(
                "user_id",
                "The selected user does not exist.",
            ));
        }
        task.assignee = Some(user);
        task.updated_at = self.clock.now();
        self.store.save_task(&task).await?;
        drop(section);

        info!(task_code = %task.code, actor = %actor.user_id, assignee = %user, "task assigned");
        self.task_view(actor, &task).await
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Add several dependencies, each one independently.
    ///
    /// Unknown codes are reported in `errors`; self-references, duplicates
    /// and cycles in `skipped`. Nothing is rolled back.
    pub async fn add_dependencies(
        &self,
        actor: &Actor,
        code: &str,
        dependency_codes: &[String],
    ) -> Result<DependencyReport, CoreError> {
        self.policy.authorize(actor, None, Action::ManageDependencies)?;
        let task = self.find_task(code).await?;

        let mut errors = Vec::new();
        let mut candidates = Vec::with_capacity(dependency_codes.len());
        let mut codes_by_id: HashMap<TaskId, TaskCode> = HashMap::new();
        for raw in dependency_codes {
            match self.lookup_code(raw).await? {
                Some(dep) => {
                    candidates.push(dep.id);
                    codes_by_id.insert(dep.id, dep.code);
                }
                None => errors.push(format!("Dependency task with code {raw} not found")),
            }
        }

        let outcome = self.graph.add_edges_batch(task.id, &candidates).await?;
        let code_of = |id: TaskId| codes_by_id.get(&id).cloned();

        errors.extend(outcome.missing.iter().map(|&id| match code_of(id) {
            Some(code) => format!("Dependency task with code {code} not found"),
            None => format!("Dependency task {id} not found"),
        }));
        let added: Vec<TaskCode> = outcome.added.iter().filter_map(|&id| code_of(id)).collect();
        let skipped: Vec<SkippedDependency> = outcome
            .skipped
            .iter()
            .filter_map(|&(id, rejection)| {
                Some(SkippedDependency {
                    code: code_of(id)?,
                    reason: rejection.reason().to_string(),
                })
            })
            .collect();

        info!(
            task_code = %task.code,
            actor = %actor.user_id,
            added = added.len(),
            skipped = skipped.len(),
            errors = errors.len(),
            "dependencies processed"
        );
        Ok(DependencyReport {
            task: self.task_view(actor, &task).await?,
            added,
            skipped,
            errors,
        })
    }

    pub async fn remove_dependency(
        &self,
        actor: &Actor,
        code: &str,
        dependency_code: &str,
    ) -> Result<TaskView, CoreError> {
        self.policy.authorize(actor, None, Action::ManageDependencies)?;
        let task = self.find_task(code).await?;
        let dependency = self
            .lookup_code(dependency_code)
            .await?
            .ok_or_else(|| CoreError::not_found("Task", "Dependency task not found"))?;

        if !self.graph.remove_edge(task.id, dependency.id).await? {
            return Err(CoreError::not_found("Dependency", "Dependency not found"));
        }
        self.task_view(actor, &task).await
    }

    /// Direct dependencies `actor` may see. A task the actor cannot view is
    /// `Forbidden` before any dependency is read.
    pub async fn get_dependencies(
        &self,
        actor: &Actor,
        code: &str,
    ) -> Result<Vec<DependencyView>, CoreError> {
        let task = self.find_task(code).await?;
        self.policy
            .authorize(actor, Some(&task), Action::ViewDependencies)?;

        let dependencies = self.graph.dependencies_of(task.id).await?;
        let visible = self.view.visible_dependencies(actor, &task, dependencies)?;
        self.dependency_views(&visible).await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Directory listing for picking assignees. Managers only.
    pub async fn list_users(
        &self,
        actor: &Actor,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, CoreError> {
        self.policy.authorize(actor, None, Action::ListUsers)?;
        let mut fields = FieldErrors::new();
        self.check_page(page, &mut fields);
        check_search(filter.search.as_deref(), &mut fields);
        if let Some(err) = CoreError::from_fields(fields) {
            return Err(err);
        }

        let users = self.users.list_users(&filter, page).await?;
        debug!(actor = %actor.user_id, total = users.pagination.total, "users listed");
        Ok(users)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn lookup_code(&self, raw: &str) -> Result<Option<Task>, CoreError> {
        match TaskCode::parse(raw.trim()) {
            Some(code) => Ok(self.store.find_by_code(&code).await?),
            None => Ok(None),
        }
    }

    async fn find_task(&self, code: &str) -> Result<Task, CoreError> {
        self.lookup_code(code)
            .await?
            .ok_or_else(CoreError::task_not_found)
    }

    fn validate_listing(&self, filter: &TaskFilter, page: PageRequest) -> Result<(), CoreError> {
        let mut fields = FieldErrors::new();
        self.check_page(page, &mut fields);
        if let (Some(from), Some(to)) = (filter.due_date_from, filter.due_date_to)
            && to < from
        {
            fields.insert(
                "due_date_to".into(),
                vec!["The due date to must be a date after or equal to due date from.".into()],
            );
        }
        check_search(filter.search.as_deref(), &mut fields);
        CoreError::from_fields(fields).map_or(Ok(()), Err)
    }

    fn check_page(&self, page: PageRequest, fields: &mut FieldErrors) {
        if page.page == 0 {
            fields.insert("page".into(), vec!["The page must be at least 1.".into()]);
        }
        let max = self.pagination.max_per_page;
        if page.per_page == 0 || page.per_page > max {
            fields.insert(
                "per_page".into(),
                vec![format!("The per page must be between 1 and {max}.")],
            );
        }
    }

    async fn check_assignee(
        &self,
        field: &str,
        user: UserId,
        fields: &mut FieldErrors,
    ) -> Result<(), CoreError> {
        if !self.users.user_exists(user).await? {
            fields
                .entry(field.to_string())
                .or_default()
                .push("The selected assigned to is invalid.".to_string());
        }
        Ok(())
    }

    async fn user_view(&self, id: Option<UserId>) -> Result<Option<UserView>, CoreError> {
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(self.users.find_user(id).await?.map(UserView::from))
    }

    async fn dependency_views(&self, tasks: &[Task]) -> Result<Vec<DependencyView>, CoreError> {
        let mut views = Vec::with_capacity(tasks.len());
        for dep in tasks {
            views.push(DependencyView::new(dep, self.user_view(dep.assignee).await?));
        }
        Ok(views)
    }

    /// Build the outward view of `task` with the dependencies `actor` may see.
    async fn task_view(&self, actor: &Actor, task: &Task) -> Result<TaskView, CoreError> {
        let dependencies = self.graph.dependencies_of(task.id).await?;
        let visible = self.view.visible_tasks(actor, dependencies);
        self.render(task, &visible).await
    }

    async fn render(&self, task: &Task, dependencies: &[Task]) -> Result<TaskView, CoreError> {
        Ok(TaskView {
            code: task.code.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date,
            assignee: self.user_view(task.assignee).await?,
            creator: self.user_view(Some(task.creator)).await?,
            completed_at: task.completed_at,
            canceled_at: task.canceled_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
            dependencies: self.dependency_views(dependencies).await?,
        })
    }
}

fn check_search(search: Option<&str>, fields: &mut FieldErrors) {
    if search.is_some_and(|s| s.chars().count() > SEARCH_MAX_CHARS) {
        fields.insert(
            "search".into(),
            vec![format!("The search may not be greater than {SEARCH_MAX_CHARS} characters.")],
        );
    }
}

/// Validate an optional title. Returns the trimmed title when present and valid.
fn check_title(title: Option<&str>, fields: &mut FieldErrors) -> Option<String> {
    let title = title?.trim();
    let message = if title.is_empty() {
        "The title field is required.".to_string()
    } else if title.chars().count() > TITLE_MAX_CHARS {
        format!("The title may not be greater than {TITLE_MAX_CHARS} characters.")
    } else {
        return Some(title.to_string());
    };
    fields.insert("title".into(), vec![message]);
    None
}
