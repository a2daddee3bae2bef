use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Failure while building a graph from an edge-list file.
///
/// A failed load never replaces the graph held by a [`crate::GraphStore`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open edge list {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error reading edge list: {0}")]
    Io(#[from] io::Error),

    #[error("malformed edge at line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("invalid node id {token:?} at line {line}")]
    InvalidNodeId { line: usize, token: String },

    #[error("edge list changed between passes at line {line}")]
    SourceChanged { line: usize },

    #[error("graph needs ~{required_mb}MB, exceeds max_memory_mb={limit_mb}MB")]
    MemoryLimitExceeded { required_mb: u64, limit_mb: u64 },

    #[error("allocation of {what} failed ({len} entries)")]
    OutOfMemory { what: &'static str, len: usize },
}

impl LoadError {
    /// 1-based line number for errors tied to a specific line.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::MalformedLine { line, .. }
            | LoadError::InvalidNodeId { line, .. }
            | LoadError::SourceChanged { line } => Some(*line),
            _ => None,
        }
    }
}

/// Failure of a read-only query. Never affects the stored graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("node {id} out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { id: NodeId, node_count: usize },

    #[error("graph is empty")]
    EmptyGraph,
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
pub type LoadResult<T> = std::result::Result<T, LoadError>;
