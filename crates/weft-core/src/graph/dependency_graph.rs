//! DependencyGraph: the single authority for mutating dependency edges.
//!
//! Every edge write goes through here so the edge set stays free of
//! self-loops, duplicates and cycles. Reads go to the store each time; the
//! graph keeps no edge state of its own.
//!
//! Validate-then-insert is two steps against shared state, so it runs inside a
//! single-writer section (`write_gate`). Two requests adding edges that are
//! each acyclic but jointly cyclic are serialized; the second one sees the
//! first one's edge and is rejected as a cycle.
//!
//! The same section covers task writes made by `TaskService`
//! (`write_section`): a completion decision and a new edge on the same task
//! never interleave, and read-modify-write of a task record is never lost.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::index::EdgeIndex;
use crate::domain::{Task, TaskId};
use crate::ports::{Clock, DependencyEdge, StoreError, TaskStore};

/// Why a single candidate edge was not added.
///
/// These are outcomes, not errors: a batch keeps going after any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRejection {
    /// The candidate task does not exist.
    NotFound,
    /// The candidate is the task itself.
    SelfReference,
    /// The edge is already stored (or was already requested in this batch).
    Duplicate,
    /// The candidate already (transitively) depends on the task.
    Cycle,
}

impl EdgeRejection {
    /// Human-readable reason used in batch responses.
    pub fn reason(self) -> &'static str {
        match self {
            EdgeRejection::NotFound => "Dependency task not found",
            EdgeRejection::SelfReference => "Cannot add self as dependency",
            EdgeRejection::Duplicate => "Dependency already exists",
            EdgeRejection::Cycle => "Circular dependency detected",
        }
    }
}

/// Outcome of a single `add_edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Added,
    Rejected(EdgeRejection),
}

/// Outcome of `add_edges_batch`.
///
/// Partial success is the normal case: each candidate is classified on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub added: Vec<TaskId>,
    /// Candidates rejected for a reason other than `NotFound`.
    pub skipped: Vec<(TaskId, EdgeRejection)>,
    /// Candidates that did not resolve to a task; reported as errors upstream.
    pub missing: Vec<TaskId>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.missing.is_empty()
    }
}

#[derive(Clone)]
pub struct DependencyGraph {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    write_gate: Arc<Mutex<()>>,
}

impl DependencyGraph {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Enter the single-writer section shared by every edge write.
    ///
    /// Not reentrant: `add_edge`, `add_edges_batch` and `remove_edge` take it
    /// themselves and must not be called while the guard is held.
    pub async fn write_section(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Is there a direct edge `task -> candidate`?
    pub async fn edge_exists(&self, task: TaskId, candidate: TaskId) -> Result<bool, StoreError> {
        self.store.edge_exists(task, candidate).await
    }

    /// Would inserting `task -> candidate` close a cycle?
    ///
    /// True iff `candidate` already reaches `task` by following depends-on
    /// edges. Iterative DFS from `candidate` with a visited set; the first
    /// neighbour equal to `task` short-circuits.
    pub async fn would_create_cycle(
        &self,
        task: TaskId,
        candidate: TaskId,
    ) -> Result<bool, StoreError> {
        let mut stack = vec![candidate];
        let mut visited = HashSet::from([candidate]);

        while let Some(node) = stack.pop() {
            for next in self.store.dependency_ids(node).await? {
                if next == task {
                    return Ok(true);
                }
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        Ok(false)
    }

    /// Validate and insert `task -> candidate`.
    ///
    /// Checks, first failure wins: candidate exists, candidate != task, edge
    /// not already stored, no cycle.
    pub async fn add_edge(
        &self,
        task: TaskId,
        candidate: TaskId,
    ) -> Result<EdgeOutcome, StoreError> {
        let _section = self.write_section().await;

        if let Some(rejection) = self.check_candidate(task, candidate).await? {
            debug!(%task, %candidate, ?rejection, "dependency rejected");
            return Ok(EdgeOutcome::Rejected(rejection));
        }

        let edge = DependencyEdge {
            task,
            depends_on: candidate,
            created_at: self.clock.now(),
        };
        if !self.store.insert_edge(edge).await? {
            // Only reachable if something wrote the edge behind the graph's back.
            warn!(%task, %candidate, "edge appeared between validation and insert");
            return Ok(EdgeOutcome::Rejected(EdgeRejection::Duplicate));
        }

        info!(%task, %candidate, "dependency added");
        Ok(EdgeOutcome::Added)
    }

    async fn check_candidate(
        &self,
        task: TaskId,
        candidate: TaskId,
    ) -> Result<Option<EdgeRejection>, StoreError> {
        if self.store.find_by_id(candidate).await?.is_none() {
            return Ok(Some(EdgeRejection::NotFound));
        }
        if candidate == task {
            return Ok(Some(EdgeRejection::SelfReference));
        }
        if self.edge_exists(task, candidate).await? {
            return Ok(Some(EdgeRejection::Duplicate));
        }
        if self.would_create_cycle(task, candidate).await? {
            return Ok(Some(EdgeRejection::Cycle));
        }
        Ok(None)
    }

    /// Add several candidates independently, in order.
    ///
    /// Not atomic. A candidate repeated in `candidates` is processed once;
    /// its repeats are reported as `Duplicate`.
    pub async fn add_edges_batch(
        &self,
        task: TaskId,
        candidates: &[TaskId],
    ) -> Result<BatchOutcome, StoreError> {
        let mut outcome = BatchOutcome::default();
        let mut seen = HashSet::new();

        for &candidate in candidates {
            if !seen.insert(candidate) {
                outcome.skipped.push((candidate, EdgeRejection::Duplicate));
                continue;
            }
            match self.add_edge(task, candidate).await? {
                EdgeOutcome::Added => outcome.added.push(candidate),
                EdgeOutcome::Rejected(EdgeRejection::NotFound) => outcome.missing.push(candidate),
                EdgeOutcome::Rejected(rejection) => outcome.skipped.push((candidate, rejection)),
            }
        }
        Ok(outcome)
    }

    /// Remove `task -> candidate`. False means there was nothing to remove.
    pub async fn remove_edge(&self, task: TaskId, candidate: TaskId) -> Result<bool, StoreError> {
        let _section = self.write_section().await;
        let removed = self.store.remove_edge(task, candidate).await?;
        if removed {
            info!(%task, %candidate, "dependency removed");
        }
        Ok(removed)
    }

    /// Tasks `task` directly depends on, soft-deleted ones included.
    pub async fn dependencies_of(&self, task: TaskId) -> Result<Vec<Task>, StoreError> {
        let ids = self.store.dependency_ids(task).await?;
        self.materialize(ids).await
    }

    /// Tasks directly waiting for `task`.
    pub async fn dependents_of(&self, task: TaskId) -> Result<Vec<Task>, StoreError> {
        let ids = self.store.dependent_ids(task).await?;
        self.materialize(ids).await
    }

    async fn materialize(&self, ids: Vec<TaskId>) -> Result<Vec<Task>, StoreError> {
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.find_by_id(id).await? {
                Some(task) => tasks.push(task),
                None => warn!(%id, "edge points at a task the store no longer has"),
            }
        }
        Ok(tasks)
    }

    /// Audit the whole edge set. `None` means acyclic.
    pub async fn detect_cycle(&self) -> Result<Option<Vec<TaskId>>, StoreError> {
        let edges = self.store.all_edges().await?;
        let index = EdgeIndex::from_pairs(edges.into_iter().map(|e| (e.task, e.depends_on)));
        Ok(index.find_cycle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskCode, TaskDraft, UserId};
    use crate::impls::InMemoryTaskStore;
    use crate::ports::SystemClock;
    use chrono::Utc;

    struct Fixture {
        store: Arc<InMemoryTaskStore>,
        graph: DependencyGraph,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryTaskStore::new());
            let graph = DependencyGraph::new(store.clone(), Arc::new(SystemClock));
            Self { store, graph }
        }

        async fn task(&self, n: u64) -> TaskId {
            let draft = TaskDraft {
                code: TaskCode::parse(&format!("TSK-{n:012}")).unwrap(),
                title: format!("task {n}"),
                description: None,
                due_date: None,
                assignee: None,
                creator: UserId::new(1),
                created_at: Utc::now(),
            };
            self.store.insert_task(draft).await.unwrap().id
        }

        async fn assert_acyclic(&self) {
            assert_eq!(self.graph.detect_cycle().await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn add_edge_inserts_and_is_visible_both_ways() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;

        assert_eq!(fx.graph.add_edge(a, b).await.unwrap(), EdgeOutcome::Added);

        assert!(fx.graph.edge_exists(a, b).await.unwrap());
        assert!(!fx.graph.edge_exists(b, a).await.unwrap());
        let deps: Vec<TaskId> = fx.graph.dependencies_of(a).await.unwrap().iter().map(|t| t.id).collect();
        let dependents: Vec<TaskId> = fx.graph.dependents_of(b).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(deps, vec![b]);
        assert_eq!(dependents, vec![a]);
    }

    #[tokio::test]
    async fn self_reference_is_rejected() {
        let fx = Fixture::new();
        let a = fx.task(1).await;

        assert_eq!(
            fx.graph.add_edge(a, a).await.unwrap(),
            EdgeOutcome::Rejected(EdgeRejection::SelfReference)
        );
        assert!(fx.graph.dependencies_of(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_candidate_wins_over_other_checks() {
        let fx = Fixture::new();
        let a = fx.task(1).await;

        assert_eq!(
            fx.graph.add_edge(a, TaskId::new(999)).await.unwrap(),
            EdgeOutcome::Rejected(EdgeRejection::NotFound)
        );
    }

    #[tokio::test]
    async fn duplicate_is_rejected_without_new_row() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;

        fx.graph.add_edge(a, b).await.unwrap();
        assert_eq!(
            fx.graph.add_edge(a, b).await.unwrap(),
            EdgeOutcome::Rejected(EdgeRejection::Duplicate)
        );
        assert_eq!(fx.store.all_edges().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn direct_and_transitive_cycles_are_rejected() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;
        let c = fx.task(3).await;

        // a -> b -> c
        fx.graph.add_edge(a, b).await.unwrap();
        fx.graph.add_edge(b, c).await.unwrap();

        assert!(fx.graph.would_create_cycle(b, a).await.unwrap());
        assert!(fx.graph.would_create_cycle(c, a).await.unwrap());
        assert!(!fx.graph.would_create_cycle(a, c).await.unwrap());

        assert_eq!(
            fx.graph.add_edge(b, a).await.unwrap(),
            EdgeOutcome::Rejected(EdgeRejection::Cycle)
        );
        assert_eq!(
            fx.graph.add_edge(c, a).await.unwrap(),
            EdgeOutcome::Rejected(EdgeRejection::Cycle)
        );
        assert!(!fx.graph.edge_exists(c, a).await.unwrap());
        fx.assert_acyclic().await;
    }

    #[tokio::test]
    async fn diamond_is_allowed() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;
        let c = fx.task(3).await;
        let d = fx.task(4).await;

        for (task, dep) in [(a, b), (a, c), (b, d), (c, d)] {
            assert_eq!(fx.graph.add_edge(task, dep).await.unwrap(), EdgeOutcome::Added);
            fx.assert_acyclic().await;
        }
    }

    #[tokio::test]
    async fn would_create_cycle_terminates_on_corrupted_data() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;
        let c = fx.task(3).await;

        // Write a cycle straight into the store, bypassing validation.
        for (task, depends_on) in [(a, b), (b, a)] {
            fx.store
                .insert_edge(DependencyEdge { task, depends_on, created_at: Utc::now() })
                .await
                .unwrap();
        }

        assert!(!fx.graph.would_create_cycle(c, a).await.unwrap());
        assert!(fx.graph.detect_cycle().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn batch_classifies_each_candidate() {
        let fx = Fixture::new();
        let task = fx.task(1).await;
        let x = fx.task(2).await;
        let y = fx.task(3).await;
        // y already depends on task, so task -> y would close a cycle.
        fx.graph.add_edge(y, task).await.unwrap();

        let outcome = fx
            .graph
            .add_edges_batch(task, &[x, x, task, y])
            .await
            .unwrap();

        assert_eq!(outcome.added, vec![x]);
        assert_eq!(
            outcome.skipped,
            vec![
                (x, EdgeRejection::Duplicate),
                (task, EdgeRejection::SelfReference),
                (y, EdgeRejection::Cycle),
            ]
        );
        assert!(outcome.missing.is_empty());
        assert!(!outcome.is_clean());
        fx.assert_acyclic().await;
    }

    #[tokio::test]
    async fn batch_reports_missing_candidates_separately() {
        let fx = Fixture::new();
        let task = fx.task(1).await;
        let x = fx.task(2).await;
        let ghost = TaskId::new(404);

        let outcome = fx.graph.add_edges_batch(task, &[ghost, x]).await.unwrap();

        assert_eq!(outcome.added, vec![x]);
        assert_eq!(outcome.missing, vec![ghost]);
        assert!(outcome.skipped.is_empty());
    }

    #[tokio::test]
    async fn remove_edge_reports_whether_anything_changed() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;

        assert!(!fx.graph.remove_edge(a, b).await.unwrap());
        fx.graph.add_edge(a, b).await.unwrap();
        assert!(fx.graph.remove_edge(a, b).await.unwrap());
        assert!(!fx.graph.edge_exists(a, b).await.unwrap());
        assert!(fx.store.all_edges().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_jointly_cyclic_additions_cannot_both_succeed() {
        for _ in 0..50 {
            let fx = Fixture::new();
            let a = fx.task(1).await;
            let b = fx.task(2).await;

            let g1 = fx.graph.clone();
            let g2 = fx.graph.clone();
            let first = tokio::spawn(async move { g1.add_edge(a, b).await.unwrap() });
            let second = tokio::spawn(async move { g2.add_edge(b, a).await.unwrap() });
            let outcomes = [first.await.unwrap(), second.await.unwrap()];

            let added = outcomes.iter().filter(|o| **o == EdgeOutcome::Added).count();
            assert_eq!(added, 1, "{outcomes:?}");
            assert!(outcomes.contains(&EdgeOutcome::Rejected(EdgeRejection::Cycle)));
            fx.assert_acyclic().await;
        }
    }

    #[tokio::test]
    async fn edge_writes_wait_for_an_open_write_section() {
        let fx = Fixture::new();
        let a = fx.task(1).await;
        let b = fx.task(2).await;

        let section = fx.graph.write_section().await;
        let graph = fx.graph.clone();
        let pending = tokio::spawn(async move { graph.add_edge(a, b).await.unwrap() });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!pending.is_finished());
        assert!(!fx.graph.edge_exists(a, b).await.unwrap());

        drop(section);
        assert_eq!(pending.await.unwrap(), EdgeOutcome::Added);
    }
}
