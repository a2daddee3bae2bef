use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::error::QueryResult;
use crate::graph::{CsrGraph, NodeId};

/// A node reached by BFS and the layer it was first reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub node: NodeId,
    pub depth: u32,
}

/// Depth-bounded BFS over outgoing edges.
///
/// Returns every node reachable from `start` in at most `max_depth` hops, in
/// discovery order: `start` first, then depth 1 in the order their parents
/// were dequeued and their adjacency order, then depth 2, and so on.
/// Each node appears once, at its minimum distance.
pub fn bfs(graph: &CsrGraph, start: NodeId, max_depth: u32) -> QueryResult<Vec<NodeId>> {
    let mut order = Vec::new();
    walk(graph, start, max_depth, |node, _| order.push(node))?;
    Ok(order)
}

/// Same traversal as [`bfs`], keeping each node's BFS layer.
pub fn bfs_levels(graph: &CsrGraph, start: NodeId, max_depth: u32) -> QueryResult<Vec<Visit>> {
    let mut order = Vec::new();
    walk(graph, start, max_depth, |node, depth| order.push(Visit { node, depth }))?;
    Ok(order)
}

fn walk<F>(graph: &CsrGraph, start: NodeId, max_depth: u32, mut on_discover: F) -> QueryResult<()>
where
    F: FnMut(NodeId, u32),
{
    graph.check_node(start)?;

    let mut visited = vec![false; graph.node_count()];
    let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();
    let mut found: usize = 1;
    let mut edges_scanned: usize = 0;

    visited[start as usize] = true;
    on_discover(start, 0);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        let neighbors = graph.out_neighbors(current);
        edges_scanned += neighbors.len();
        for &next in neighbors {
            let seen = &mut visited[next as usize];
            if !*seen {
                *seen = true;
                found += 1;
                on_discover(next, depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }

    debug!(start, max_depth, found, edges_scanned, "traversal.bfs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    fn make_chain(n: NodeId) -> CsrGraph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        CsrGraph::from_edges(&edges)
    }

    fn make_star(leaves: NodeId) -> CsrGraph {
        let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
        CsrGraph::from_edges(&edges)
    }

    fn make_cycle(n: NodeId) -> CsrGraph {
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        CsrGraph::from_edges(&edges)
    }

    // --- BFS tests ---

    #[test]
    fn test_bfs_sample_graph() {
        let g = CsrGraph::from_edges(&[(0, 1), (0, 2), (1, 2), (2, 3)]);
        assert_eq!(bfs(&g, 0, 1).unwrap(), vec![0, 1, 2]);
        assert_eq!(bfs(&g, 0, 2).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bfs_chain() {
        let g = make_chain(6);
        let levels = bfs_levels(&g, 0, 10).unwrap();
        assert_eq!(levels.len(), 6);
        assert_eq!(levels[5], Visit { node: 5, depth: 5 });
    }

    #[test]
    fn test_bfs_chain_depth_limited() {
        let g = make_chain(10);
        let result = bfs(&g, 0, 3).unwrap();
        assert_eq!(result, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bfs_star() {
        let g = make_star(100);
        let levels = bfs_levels(&g, 0, 1).unwrap();
        assert_eq!(levels.len(), 101);
        assert!(levels[1..].iter().all(|v| v.depth == 1));
    }

    #[test]
    fn test_bfs_cycle_no_infinite_loop() {
        let g = make_cycle(5);
        let result = bfs(&g, 0, 100).unwrap();
        assert_eq!(result, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bfs_respects_direction() {
        // 0→1: from 1 there is nothing to follow.
        let g = make_chain(2);
        assert_eq!(bfs(&g, 1, 5).unwrap(), vec![1]);
    }

    #[test]
    fn test_bfs_depth_zero() {
        let g = make_chain(5);
        assert_eq!(bfs(&g, 2, 0).unwrap(), vec![2]);
    }

    #[test]
    fn test_bfs_self_loop() {
        let g = CsrGraph::from_edges(&[(0, 0)]);
        assert_eq!(bfs(&g, 0, 5).unwrap(), vec![0]);
    }

    #[test]
    fn test_bfs_parallel_edges() {
        let g = CsrGraph::from_edges(&[(0, 1), (0, 1), (0, 1)]);
        assert_eq!(bfs(&g, 0, 1).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_bfs_discovery_order_follows_parents() {
        // Layer 1 is [2, 1]; 2's child 4 is discovered before 1's child 3.
        let g = CsrGraph::from_edges(&[(0, 2), (0, 1), (1, 3), (2, 4), (1, 4)]);
        let levels = bfs_levels(&g, 0, 5).unwrap();
        assert_eq!(
            levels,
            vec![
                Visit { node: 0, depth: 0 },
                Visit { node: 2, depth: 1 },
                Visit { node: 1, depth: 1 },
                Visit { node: 4, depth: 2 },
                Visit { node: 3, depth: 2 },
            ]
        );
    }

    #[test]
    fn test_bfs_first_discovery_wins() {
        // 3 is reachable at depth 1 directly and depth 2 via 1.
        let g = CsrGraph::from_edges(&[(0, 1), (1, 3), (0, 3)]);
        let levels = bfs_levels(&g, 0, 5).unwrap();
        let three = levels.iter().find(|v| v.node == 3).unwrap();
        assert_eq!(three.depth, 1);
    }

    #[test]
    fn test_bfs_start_out_of_range() {
        let g = make_chain(3);
        assert_eq!(
            bfs(&g, 3, 1),
            Err(QueryError::NodeOutOfRange { id: 3, node_count: 3 })
        );
    }

    #[test]
    fn test_bfs_empty_graph() {
        let g = CsrGraph::new();
        assert!(matches!(bfs(&g, 0, 1), Err(QueryError::NodeOutOfRange { .. })));
    }

    #[test]
    fn test_bfs_sink_node() {
        let g = CsrGraph::from_edges(&[(0, 1), (0, 2)]);
        assert_eq!(bfs(&g, 2, 50).unwrap(), vec![2]);
    }
}
