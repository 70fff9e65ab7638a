//! InMemoryTaskStore - 開発・テスト用の正本
//!
//! # 実装詳細
//! - tasks: HashMap<TaskId, Task>（soft delete 済みも保持）
//! - codes: HashMap<TaskCode, TaskId>（code の一意性制約。hard delete 後も残す）
//! - edges: EdgeIndex（(task, depends_on) の一意性制約、双方向インデックス）
//! - tokio::sync::Mutex で排他制御（await を跨いでもロックを保持できる）

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{Page, PageRequest, Task, TaskCode, TaskDraft, TaskFilter, TaskId};
use crate::graph::EdgeIndex;
use crate::ports::{DependencyEdge, StoreError, TaskStore};

#[derive(Default)]
struct State {
    next_id: u64,
    tasks: HashMap<TaskId, Task>,
    codes: HashMap<TaskCode, TaskId>,
    edges: EdgeIndex,
    edge_created_at: HashMap<(TaskId, TaskId), DateTime<Utc>>,
}

/// InMemoryTaskStore は開発用の TaskStore
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(InMemoryTaskStore::new());
/// let task = store.insert_task(draft).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Listing order: due date ascending with undated tasks last, then newest
/// first, then id.
fn listing_order(a: &Task, b: &Task) -> Ordering {
    let by_due = match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_due
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert_task(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        let mut state = self.state.lock().await;
        if state.codes.contains_key(&draft.code) {
            return Err(StoreError::Conflict(format!("task code {}", draft.code)));
        }
        state.next_id += 1;
        let id = TaskId::new(state.next_id);
        let task = draft.into_task(id);
        state.codes.insert(task.code.clone(), id);
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.state.lock().await.tasks.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &TaskCode) -> Result<Option<Task>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .codes
            .get(code)
            .and_then(|id| state.tasks.get(id))
            .filter(|task| !task.is_deleted())
            .cloned())
    }

    async fn code_exists(&self, code: &TaskCode) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.codes.contains_key(code))
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        match state.tasks.get_mut(&task.id) {
            Some(stored) if stored.code == task.code => {
                *stored = task.clone();
                Ok(())
            }
            Some(_) => Err(StoreError::Conflict(format!(
                "{} cannot change its code",
                task.id
            ))),
            None => Err(StoreError::Other(format!("{} does not exist", task.id))),
        }
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, StoreError> {
        let state = self.state.lock().await;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        matching.sort_by(listing_order);
        Ok(Page::slice(matching, page))
    }

    async fn hard_delete(&self, id: TaskId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if state.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        // The code entry stays behind as a tombstone so it is never reissued.
        state.edges.remove_node(id);
        state
            .edge_created_at
            .retain(|(from, to), _| *from != id && *to != id);
        Ok(true)
    }

    async fn edge_exists(&self, task: TaskId, depends_on: TaskId) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.edges.contains(task, depends_on))
    }

    async fn insert_edge(&self, edge: DependencyEdge) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        for endpoint in [edge.task, edge.depends_on] {
            if !state.tasks.contains_key(&endpoint) {
                return Err(StoreError::Other(format!("{endpoint} does not exist")));
            }
        }
        if !state.edges.insert(edge.task, edge.depends_on) {
            return Ok(false);
        }
        state
            .edge_created_at
            .insert((edge.task, edge.depends_on), edge.created_at);
        Ok(true)
    }

    async fn remove_edge(&self, task: TaskId, depends_on: TaskId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.edge_created_at.remove(&(task, depends_on));
        Ok(state.edges.remove(task, depends_on))
    }

    async fn dependency_ids(&self, task: TaskId) -> Result<Vec<TaskId>, StoreError> {
        Ok(self.state.lock().await.edges.dependencies(task).collect())
    }

    async fn dependent_ids(&self, task: TaskId) -> Result<Vec<TaskId>, StoreError> {
        Ok(self.state.lock().await.edges.dependents(task).collect())
    }

    async fn all_edges(&self) -> Result<Vec<DependencyEdge>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .edges
            .pairs()
            .filter_map(|(task, depends_on)| {
                let created_at = *state.edge_created_at.get(&(task, depends_on))?;
                Some(DependencyEdge {
                    task,
                    depends_on,
                    created_at,
                })
            })
            .collect())
    }
}
