//! In-memory adjacency index for dependency edges.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on (waits for)
//! - Reverse edges: task -> tasks that depend on it (waiting tasks)
//! - Invariant: edges and reverse_edges must be kept in sync
//!
//! Used as the edge table of `InMemoryTaskStore` and as a snapshot for
//! whole-graph audits (`DependencyGraph::detect_cycle`).

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::TaskId;

/// Adjacency index over task ids.
///
/// `BTreeSet` keeps neighbour lists ordered by id so traversal and listing
/// results are deterministic.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    /// Forward edges: task -> tasks it depends on
    edges: BTreeMap<TaskId, BTreeSet<TaskId>>,

    /// Reverse edges: task -> tasks that depend on it
    reverse_edges: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

impl EdgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(task, depends_on)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TaskId, TaskId)>) -> Self {
        let mut index = Self::new();
        for (task, depends_on) in pairs {
            index.insert(task, depends_on);
        }
        index
    }

    /// Record that `task` depends on `depends_on`. Returns false if the edge
    /// was already present.
    pub fn insert(&mut self, task: TaskId, depends_on: TaskId) -> bool {
        let inserted = self.edges.entry(task).or_default().insert(depends_on);
        self.reverse_edges.entry(depends_on).or_default().insert(task);
        inserted
    }

    /// Remove `task -> depends_on`. Returns false if there was no such edge.
    pub fn remove(&mut self, task: TaskId, depends_on: TaskId) -> bool {
        let removed = match self.edges.entry(task) {
            Entry::Occupied(mut e) => {
                let removed = e.get_mut().remove(&depends_on);
                if e.get().is_empty() {
                    e.remove_entry();
                }
                removed
            }
            Entry::Vacant(_) => false,
        };
        if let Entry::Occupied(mut e) = self.reverse_edges.entry(depends_on) {
            e.get_mut().remove(&task);
            if e.get().is_empty() {
                e.remove_entry();
            }
        }
        removed
    }

    /// Drop every edge touching `node` (hard delete cascade). Returns the
    /// number of edges removed.
    pub fn remove_node(&mut self, node: TaskId) -> usize {
        let outgoing: Vec<TaskId> = self.dependencies(node).collect();
        let incoming: Vec<TaskId> = self.dependents(node).collect();
        let mut removed = 0;
        for depends_on in outgoing {
            removed += usize::from(self.remove(node, depends_on));
        }
        for task in incoming {
            removed += usize::from(self.remove(task, node));
        }
        removed
    }

    pub fn contains(&self, task: TaskId, depends_on: TaskId) -> bool {
        self.edges
            .get(&task)
            .is_some_and(|deps| deps.contains(&depends_on))
    }

    /// Direct dependencies of `task`, ascending by id.
    pub fn dependencies(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.edges.get(&task).into_iter().flatten().copied()
    }

    /// Direct dependents of `task`, ascending by id.
    pub fn dependents(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.reverse_edges.get(&task).into_iter().flatten().copied()
    }

    /// All `(task, depends_on)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (TaskId, TaskId)> + '_ {
        self.edges
            .iter()
            .flat_map(|(task, deps)| deps.iter().map(move |dep| (*task, *dep)))
    }

    pub fn len(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Find a cycle, if any.
    ///
    /// Returns the cycle as a path that starts and ends on the same node, e.g.
    /// `[a, b, c, a]` for a -> b -> c -> a. Iterative three-colour DFS: O(V + E).
    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        let mut color: HashMap<TaskId, Color> = HashMap::new();

        for &root in self.edges.keys() {
            if color.contains_key(&root) {
                continue;
            }
            // (node, remaining neighbours) frames; `path` mirrors the gray nodes.
            let mut frames: Vec<(TaskId, Vec<TaskId>)> = vec![(root, self.neighbours_rev(root))];
            let mut path = vec![root];
            color.insert(root, Color::Gray);

            while let Some((node, pending)) = frames.last_mut() {
                let node = *node;
                match pending.pop() {
                    Some(next) => match color.get(&next) {
                        Some(Color::Gray) => {
                            let start = path.iter().position(|&n| n == next).unwrap_or(0);
                            let mut cycle = path[start..].to_vec();
                            cycle.push(next);
                            return Some(cycle);
                        }
                        Some(Color::Black) => {}
                        None => {
                            color.insert(next, Color::Gray);
                            path.push(next);
                            frames.push((next, self.neighbours_rev(next)));
                        }
                    },
                    None => {
                        color.insert(node, Color::Black);
                        path.pop();
                        frames.pop();
                    }
                }
            }
        }
        None
    }

    /// Neighbours in reverse order so `pop()` visits them ascending.
    fn neighbours_rev(&self, node: TaskId) -> Vec<TaskId> {
        let mut next: Vec<TaskId> = self.dependencies(node).collect();
        next.reverse();
        next
    }
}
