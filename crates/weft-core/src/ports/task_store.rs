//! TaskStore port - タスクと依存辺の正本（source of truth）
//!
//! TaskStore は以下を管理します：
//! - タスク（internal id と code の両方で引ける）
//! - 依存辺（(task, depends_on) の組で一意）
//!
//! # 実装
//! - `impls::InMemoryTaskStore`（開発・テスト用）
//! - RDB 実装は別クレートに置く想定。スキーマ上の制約（code の一意性、
//!   辺の組の一意性、status の 4 値制約、hard delete 時の cascade）は
//!   どの実装でも守ること

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Page, PageRequest, Task, TaskCode, TaskDraft, TaskFilter, TaskId};

/// Backing-store fault. Never a business outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("{0}")]
    Other(String),
}

/// A stored dependency edge: `task` waits for `depends_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub task: TaskId,
    pub depends_on: TaskId,
    pub created_at: DateTime<Utc>,
}

/// TaskStore は状態と依存関係の正本
///
/// # 設計原則
/// - lookups by code and listings hide soft-deleted tasks
/// - lookups by id do not: an edge endpoint stays addressable after a soft delete
/// - edges are only written by `graph::DependencyGraph`
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task; the store assigns the id. Fails with `Conflict`
    /// when the code is already taken.
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task, StoreError>;

    /// Find by internal id, including soft-deleted tasks.
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Find a live (not soft-deleted) task by code.
    async fn find_by_code(&self, code: &TaskCode) -> Result<Option<Task>, StoreError>;

    /// Has this code ever been issued? Soft-deleted tasks count: codes are never reused.
    async fn code_exists(&self, code: &TaskCode) -> Result<bool, StoreError>;

    /// Overwrite the stored record with `task` (matched by id).
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Filtered, ordered, paginated listing of live tasks.
    ///
    /// Order: due date ascending (undated last), then newest first, then id.
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, StoreError>;

    /// Physically remove a task, cascading to every edge touching it.
    async fn hard_delete(&self, id: TaskId) -> Result<bool, StoreError>;

    async fn edge_exists(&self, task: TaskId, depends_on: TaskId) -> Result<bool, StoreError>;

    /// Unique-pair insert. Returns false (and writes nothing) if the pair exists.
    async fn insert_edge(&self, edge: DependencyEdge) -> Result<bool, StoreError>;

    /// Returns false if there was no such edge.
    async fn remove_edge(&self, task: TaskId, depends_on: TaskId) -> Result<bool, StoreError>;

    /// Direct dependencies of `task`, ascending by id.
    async fn dependency_ids(&self, task: TaskId) -> Result<Vec<TaskId>, StoreError>;

    /// Direct dependents of `task` (tasks waiting for it), ascending by id.
    async fn dependent_ids(&self, task: TaskId) -> Result<Vec<TaskId>, StoreError>;

    /// Every stored edge; used for whole-graph audits.
    async fn all_edges(&self) -> Result<Vec<DependencyEdge>, StoreError>;
}
