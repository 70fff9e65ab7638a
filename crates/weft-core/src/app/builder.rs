//! TaskServiceBuilder - TaskService の構築とワイヤリング
//!
//! # 設計
//! - store と user directory は必須。欠けていれば build() で BuildError（Fail-fast）
//! - clock / code generator / policy / pagination は省略時にデフォルト
//! - DependencyGraph / Guard / View は同じ clock と policy を共有する

use std::sync::Arc;

use super::task_service::TaskService;
use crate::config::{AppConfig, PaginationConfig};
use crate::engine::{PermissionView, Policy, RolePolicy, StatusTransitionGuard};
use crate::graph::DependencyGraph;
use crate::ports::{Clock, CodeGenerator, RandomCodeGenerator, SystemClock, TaskStore, UserDirectory};

/// TaskServiceBuilder は TaskService を構築
///
/// # 使用例
/// ```ignore
/// let service = TaskServiceBuilder::new()
///     .store(Arc::new(InMemoryTaskStore::new()))
///     .users(Arc::new(InMemoryUserDirectory::new()))
///     .config(&config)
///     .build()?;
/// ```
#[derive(Default)]
pub struct TaskServiceBuilder {
    store: Option<Arc<dyn TaskStore>>,
    users: Option<Arc<dyn UserDirectory>>,
    clock: Option<Arc<dyn Clock>>,
    codes: Option<Arc<dyn CodeGenerator>>,
    policy: Option<Arc<dyn Policy>>,
    pagination: PaginationConfig,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no TaskStore was provided")]
    MissingStore,

    #[error("no UserDirectory was provided")]
    MissingUserDirectory,
}

impl TaskServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Take every setting the service cares about from `config`.
    pub fn config(self, config: &AppConfig) -> Self {
        self.pagination(config.pagination)
    }

    pub fn build(self) -> Result<TaskService, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let users = self.users.ok_or(BuildError::MissingUserDirectory)?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let codes = self.codes.unwrap_or_else(|| Arc::new(RandomCodeGenerator));
        let policy = self.policy.unwrap_or_else(|| Arc::new(RolePolicy));

        Ok(TaskService {
            graph: DependencyGraph::new(store.clone(), clock.clone()),
            guard: StatusTransitionGuard::new(clock.clone()),
            view: PermissionView::new(policy.clone()),
            store,
            users,
            clock,
            codes,
            policy,
            pagination: self.pagination,
        })
    }
}
