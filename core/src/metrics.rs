use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::graph::{CsrGraph, NodeId};

/// Out-degree of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DegreeEntry {
    pub node: NodeId,
    pub degree: usize,
}

/// Node with the largest out-degree.
///
/// Single ascending scan; on ties the lowest id wins because a later node
/// only replaces the running maximum when strictly larger.
pub fn max_degree_node(graph: &CsrGraph) -> QueryResult<NodeId> {
    if graph.is_empty() {
        return Err(QueryError::EmptyGraph);
    }

    let mut best: NodeId = 0;
    let mut best_degree = graph.out_degree(0);
    for i in 1..graph.node_count() {
        let d = graph.out_degree(i as NodeId);
        if d > best_degree {
            best = i as NodeId;
            best_degree = d;
        }
    }
    Ok(best)
}

/// Return nodes ranked by out-degree.
///
/// If `top_n` is 0, returns all nodes. Otherwise returns the top N by
/// degree (descending). Ties are broken by node id (ascending).
pub fn degree_ranking(graph: &CsrGraph, top_n: usize) -> Vec<DegreeEntry> {
    let mut results: Vec<DegreeEntry> = (0..graph.node_count())
        .map(|i| DegreeEntry {
            node: i as NodeId,
            degree: graph.out_degree(i as NodeId),
        })
        .collect();

    results.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.node.cmp(&b.node)));

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }

    results
}
