//! neuronet-core: sparse directed-graph engine.
//!
//! Loads an edge-list file into a compressed sparse row layout and answers
//! read-only queries over it: counts and memory estimate, per-node
//! out-degree, maximum-degree node, depth-bounded BFS and subgraph edge
//! extraction. The graph is immutable once loaded; [`GraphStore`] swaps in a
//! whole new graph on each successful load.
//!
//! Threading is left to the caller. A `GraphStore` may be shared across
//! threads: queries run concurrently against immutable snapshots, loads are
//! serialized.

mod config;
mod error;
mod graph;
mod load;
mod metrics;
mod store;
mod subgraph;
mod traversal;

pub use config::{LoadOptions, ENV_COMMENT_PREFIXES, ENV_MAX_MEMORY_MB};
pub use error::{LoadError, LoadResult, QueryError, QueryResult};
pub use graph::{CsrGraph, NodeId};
pub use load::{load_edge_list, LoadStats};
pub use metrics::{degree_ranking, max_degree_node, DegreeEntry};
pub use store::{GraphState, GraphStatus, GraphStore, LoadSummary};
pub use subgraph::{extract_subgraph, subgraph_edges, Subgraph};
pub use traversal::{bfs, bfs_levels, Visit};
