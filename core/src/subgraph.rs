use serde::Serialize;
use tracing::debug;

use crate::error::QueryResult;
use crate::graph::{CsrGraph, NodeId};
use crate::traversal::bfs;

/// Nodes reached from a start node plus the edges among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subgraph {
    /// BFS discovery order, start node first.
    pub nodes: Vec<NodeId>,
    /// Directed `(src, dst)` pairs with both endpoints in `nodes`.
    pub edges: Vec<(NodeId, NodeId)>,
}

const ABSENT: u8 = 0;
const MEMBER: u8 = 1;
const SCANNED: u8 = 2;

/// Edges of `graph` whose source and destination are both in `nodes`.
///
/// Sources are visited in the order given (a repeated id is scanned once),
/// destinations in stored adjacency order. Edges are emitted exactly as
/// stored: `(a, b)` and `(b, a)` both appear if both exist, as do duplicates.
/// Any id outside `[0, node_count)` fails the whole call.
pub fn subgraph_edges(graph: &CsrGraph, nodes: &[NodeId]) -> QueryResult<Vec<(NodeId, NodeId)>> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }
    for &id in nodes {
        graph.check_node(id)?;
    }

    let mut state = vec![ABSENT; graph.node_count()];
    for &id in nodes {
        state[id as usize] = MEMBER;
    }

    let mut edges = Vec::new();
    for &src in nodes {
        if state[src as usize] == SCANNED {
            continue;
        }
        state[src as usize] = SCANNED;

        for &dst in graph.out_neighbors(src) {
            if state[dst as usize] != ABSENT {
                edges.push((src, dst));
            }
        }
    }

    debug!(nodes = nodes.len(), edges = edges.len(), "subgraph.edges");
    Ok(edges)
}

/// Extract the subgraph reachable from `start` within `max_depth` hops.
///
/// Phase 1: BFS to discover reachable nodes.
/// Phase 2: collect the edges among the discovered nodes.
pub fn extract_subgraph(graph: &CsrGraph, start: NodeId, max_depth: u32) -> QueryResult<Subgraph> {
    let nodes = bfs(graph, start, max_depth)?;
    let edges = subgraph_edges(graph, &nodes)?;
    Ok(Subgraph { nodes, edges })
}
