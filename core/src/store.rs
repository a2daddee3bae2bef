//! Loaded-graph holder with a single-writer / multiple-reader discipline.
//!
//! Readers take an `Arc` snapshot of the current state and query it without
//! holding any lock. A load builds the replacement graph off to the side and
//! swaps the `Arc` under a short write lock, so a reader sees either the old
//! graph or the new one, never a mixture. Loads are serialized by `writer`.
//!
//! A failed load leaves the previous graph in place and queryable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::LoadOptions;
use crate::error::{LoadResult, QueryResult};
use crate::graph::{CsrGraph, NodeId};
use crate::load::load_edge_list;
use crate::metrics;
use crate::subgraph;
use crate::traversal;

/// An immutable loaded graph plus where it came from.
#[derive(Debug)]
pub struct GraphState {
    pub graph: CsrGraph,
    pub source: Option<PathBuf>,
    pub load_time_ms: f64,
    /// Incremented on every successful load. 0 = nothing loaded yet.
    pub generation: u64,
}

impl GraphState {
    fn empty() -> Self {
        Self {
            graph: CsrGraph::new(),
            source: None,
            load_time_ms: 0.0,
            generation: 0,
        }
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub skipped_lines: usize,
    pub memory_mb: u64,
    pub load_time_ms: f64,
    pub generation: u64,
}

/// Point-in-time description of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatus {
    pub loaded: bool,
    pub source: Option<PathBuf>,
    pub node_count: usize,
    pub edge_count: usize,
    pub directed: bool,
    pub memory_mb: u64,
    pub load_time_ms: f64,
    pub generation: u64,
}

impl fmt::Display for GraphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => writeln!(f, "source:    {}", path.display())?,
            None => writeln!(f, "source:    (not loaded)")?,
        }
        writeln!(f, "nodes:     {}", self.node_count)?;
        writeln!(f, "edges:     {}", self.edge_count)?;
        writeln!(f, "directed:  {}", if self.directed { "yes" } else { "no" })?;
        writeln!(f, "memory:    {} MB", self.memory_mb)?;
        write!(f, "load time: {:.1} ms", self.load_time_ms)
    }
}

pub struct GraphStore {
    options: LoadOptions,
    current: RwLock<Arc<GraphState>>,
    writer: Mutex<()>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            current: RwLock::new(Arc::new(GraphState::empty())),
            writer: Mutex::new(()),
        }
    }

    /// Store configured from `NEURONET_*` environment variables.
    pub fn from_env() -> Self {
        Self::with_options(LoadOptions::from_env())
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load an edge-list file, replacing the current graph on success.
    ///
    /// Blocks until any other in-flight load on this store finishes.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadResult<LoadSummary> {
        let path = path.as_ref();
        let _writer = self.writer.lock();
        let start = Instant::now();

        let (graph, stats) = match load_edge_list(path, &self.options) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "load.failed");
                return Err(err);
            }
        };

        let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let generation = self.current.read().generation + 1;
        let summary = LoadSummary {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            skipped_lines: stats.skipped_lines,
            memory_mb: graph.memory_estimate_mb(),
            load_time_ms,
            generation,
        };

        let next = Arc::new(GraphState {
            graph,
            source: Some(path.to_path_buf()),
            load_time_ms,
            generation,
        });
        let previous = std::mem::replace(&mut *self.current.write(), next);
        // Free the old arrays outside the write lock.
        drop(previous);

        info!(
            path = %path.display(),
            nodes = summary.node_count,
            edges = summary.edge_count,
            memory_mb = summary.memory_mb,
            elapsed_ms = summary.load_time_ms,
            generation,
            "load.complete"
        );
        Ok(summary)
    }

    /// Immutable view of the current graph. Stays valid across later loads.
    pub fn snapshot(&self) -> Arc<GraphState> {
        Arc::clone(&self.current.read())
    }

    /// Execute a closure against the current graph without holding the lock.
    pub fn with_graph<R, F: FnOnce(&CsrGraph) -> R>(&self, f: F) -> R {
        let state = self.snapshot();
        f(&state.graph)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().generation > 0
    }

    pub fn node_count(&self) -> usize {
        self.with_graph(|g| g.node_count())
    }

    pub fn edge_count(&self) -> usize {
        self.with_graph(|g| g.edge_count())
    }

    pub fn memory_estimate_mb(&self) -> u64 {
        self.with_graph(|g| g.memory_estimate_mb())
    }

    pub fn degree(&self, id: NodeId) -> QueryResult<usize> {
        self.with_graph(|g| g.degree(id))
    }

    pub fn neighbors(&self, id: NodeId) -> QueryResult<Vec<NodeId>> {
        self.with_graph(|g| g.neighbors(id).map(<[NodeId]>::to_vec))
    }

    pub fn max_degree_node(&self) -> QueryResult<NodeId> {
        self.with_graph(metrics::max_degree_node)
    }

    pub fn bfs(&self, start: NodeId, max_depth: u32) -> QueryResult<Vec<NodeId>> {
        self.with_graph(|g| traversal::bfs(g, start, max_depth))
    }

    pub fn subgraph_edges(&self, nodes: &[NodeId]) -> QueryResult<Vec<(NodeId, NodeId)>> {
        self.with_graph(|g| subgraph::subgraph_edges(g, nodes))
    }

    pub fn status(&self) -> GraphStatus {
        let state = self.snapshot();
        GraphStatus {
            loaded: state.generation > 0,
            source: state.source.clone(),
            node_count: state.graph.node_count(),
            edge_count: state.graph.edge_count(),
            directed: state.graph.is_directed(),
            memory_mb: state.graph.memory_estimate_mb(),
            load_time_ms: state.load_time_ms,
            generation: state.generation,
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, QueryError};
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_status_not_loaded() {
        let store = GraphStore::new();
        let status = store.status();
        assert!(!status.loaded);
        assert_eq!(status.node_count, 0);
        assert_eq!(status.generation, 0);
        assert_eq!(store.max_degree_node(), Err(QueryError::EmptyGraph));
        assert_eq!(store.degree(0), Err(QueryError::EmptyGraph));
    }

    #[test]
    fn test_load_replaces_graph() {
        let store = GraphStore::new();
        let a = write_file("0 1\n");
        let b = write_file("0 1\n1 2\n2 0\n");

        let first = store.load(a.path()).unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(store.node_count(), 2);

        let second = store.load(b.path()).unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.status().source.as_deref(), Some(b.path()));
    }

    #[test]
    fn test_failed_load_keeps_previous_graph() {
        let store = GraphStore::new();
        let good = write_file("0 1\n0 2\n1 2\n2 3\n");
        let bad = write_file("0 1\n5 6\nnot an edge\n");

        store.load(good.path()).unwrap();
        let err = store.load(bad.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedLine { line: 3, .. }));

        assert_eq!(store.node_count(), 4);
        assert_eq!(store.edge_count(), 4);
        assert_eq!(store.status().generation, 1);
        assert_eq!(store.bfs(0, 2).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let store = GraphStore::new();
        let a = write_file("0 1\n");
        let b = write_file("0 1\n1 2\n");
        store.load(a.path()).unwrap();

        let old = store.snapshot();
        store.load(b.path()).unwrap();

        assert_eq!(old.graph.node_count(), 2);
        assert_eq!(store.node_count(), 3);
    }

    #[test]
    fn test_status_display() {
        let store = GraphStore::new();
        let f = write_file("0 1\n");
        store.load(f.path()).unwrap();
        let text = store.status().to_string();
        assert!(text.contains("nodes:     2"));
        assert!(text.contains("directed:  yes"));
    }

    #[test]
    fn test_neighbors_via_store() {
        let store = GraphStore::new();
        let f = write_file("0 2\n0 1\n");
        store.load(f.path()).unwrap();
        assert_eq!(store.neighbors(0).unwrap(), vec![2, 1]);
        assert!(store.neighbors(3).is_err());
    }
}
