//! Dependency graph: edge validation, mutation and cycle detection.

mod dependency_graph;
mod index;

pub use dependency_graph::{BatchOutcome, DependencyGraph, EdgeOutcome, EdgeRejection};
pub use index::EdgeIndex;
