use std::mem::size_of;

use crate::config::LoadOptions;
use crate::error::{LoadError, LoadResult, QueryError, QueryResult};

/// Dense node identifier in `[0, node_count)`.
///
/// `u32` halves the size of the target array compared to `u64` and still
/// addresses ~4 billion nodes.
pub type NodeId = u32;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Read-only directed graph in compressed sparse row layout.
///
/// `offsets[i]..offsets[i + 1]` is the slice of `targets` holding node `i`'s
/// outgoing neighbors, in the order the edges appeared in the source.
/// `offsets` has `node_count + 1` entries and `offsets[node_count]` equals the
/// edge count. Duplicate edges and self-loops are kept as stored.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    offsets: Vec<u64>,
    targets: Vec<NodeId>,
}

impl CsrGraph {
    /// The empty graph: zero nodes, zero edges.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            targets: Vec::new(),
        }
    }

    /// Build from an in-memory edge list. Node count is one past the
    /// largest id seen.
    ///
    /// Allocates without a memory cap and aborts like any `Vec` if the
    /// allocation fails. Use [`CsrGraph::try_from_edges`] when ids come from
    /// untrusted input.
    pub fn from_edges(edges: &[(NodeId, NodeId)]) -> Self {
        let Some(node_count) = node_count_of(edges) else {
            return Self::new();
        };
        let mut offsets = vec![0u64; node_count + 1];
        let mut targets = vec![0 as NodeId; edges.len()];
        fill_csr(edges, &mut offsets, &mut targets);
        Self::from_parts(offsets, targets)
    }

    /// Capped, fallible variant of [`CsrGraph::from_edges`].
    ///
    /// Fails with `MemoryLimitExceeded` before allocating when the graph
    /// would exceed `options.max_memory_mb`, and with `OutOfMemory` when an
    /// allocation is refused.
    pub fn try_from_edges(edges: &[(NodeId, NodeId)], options: &LoadOptions) -> LoadResult<Self> {
        let Some(node_count) = node_count_of(edges) else {
            return Ok(Self::new());
        };
        check_memory(node_count, edges.len(), options.max_memory_mb)?;
        let mut offsets = try_zeroed::<u64>(node_count + 1, "offsets")?;
        let mut targets = try_zeroed::<NodeId>(edges.len(), "targets")?;
        fill_csr(edges, &mut offsets, &mut targets);
        Ok(Self::from_parts(offsets, targets))
    }

    /// Assemble from prebuilt arrays. Callers guarantee the CSR invariants.
    pub(crate) fn from_parts(offsets: Vec<u64>, targets: Vec<NodeId>) -> Self {
        debug_assert!(!offsets.is_empty());
        debug_assert_eq!(offsets.last().copied(), Some(targets.len() as u64));
        debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        Self { offsets, targets }
    }

    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Always true: edges are stored and traversed in their given direction.
    pub fn is_directed(&self) -> bool {
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (id as usize) < self.node_count()
    }

    /// Validate `id` against the node range.
    pub fn check_node(&self, id: NodeId) -> QueryResult<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(QueryError::NodeOutOfRange {
                id,
                node_count: self.node_count(),
            })
        }
    }

    /// Out-degree of `id`. O(1).
    ///
    /// Fails with `EmptyGraph` before anything is loaded, and with
    /// `NodeOutOfRange` for ids outside `[0, node_count)`.
    pub fn degree(&self, id: NodeId) -> QueryResult<usize> {
        if self.is_empty() {
            return Err(QueryError::EmptyGraph);
        }
        self.check_node(id)?;
        Ok(self.out_degree(id))
    }

    /// Outgoing neighbors of `id`, in stored order.
    pub fn neighbors(&self, id: NodeId) -> QueryResult<&[NodeId]> {
        self.check_node(id)?;
        Ok(self.out_neighbors(id))
    }

    /// Unchecked variant for ids already known to be in range.
    pub(crate) fn out_degree(&self, id: NodeId) -> usize {
        let i = id as usize;
        (self.offsets[i + 1] - self.offsets[i]) as usize
    }

    pub(crate) fn out_neighbors(&self, id: NodeId) -> &[NodeId] {
        let i = id as usize;
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        &self.targets[start..end]
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> u64 {
        estimate_bytes(self.node_count(), self.edge_count())
    }

    /// Memory estimate rounded to the nearest whole megabyte.
    pub fn memory_estimate_mb(&self) -> u64 {
        bytes_to_mb(self.memory_usage())
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of a CSR graph with the given shape: both arrays plus the struct.
pub(crate) fn estimate_bytes(node_count: usize, edge_count: usize) -> u64 {
    (node_count as u64 + 1) * size_of::<u64>() as u64
        + edge_count as u64 * size_of::<NodeId>() as u64
        + size_of::<CsrGraph>() as u64
}

pub(crate) fn bytes_to_mb(bytes: u64) -> u64 {
    (bytes + BYTES_PER_MB / 2) / BYTES_PER_MB
}

/// Fail with `MemoryLimitExceeded` when a graph of this shape would not fit
/// under `limit_mb`.
pub(crate) fn check_memory(node_count: usize, edge_count: usize, limit_mb: u64) -> LoadResult<()> {
    let required_mb = bytes_to_mb(estimate_bytes(node_count, edge_count));
    if required_mb > limit_mb {
        return Err(LoadError::MemoryLimitExceeded {
            required_mb,
            limit_mb,
        });
    }
    Ok(())
}

/// Zero-filled vector of `len` entries, or `OutOfMemory` if the reservation
/// is refused.
pub(crate) fn try_zeroed<T: Copy + Default>(len: usize, what: &'static str) -> LoadResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| LoadError::OutOfMemory { what, len })?;
    v.resize(len, T::default());
    Ok(v)
}

fn node_count_of(edges: &[(NodeId, NodeId)]) -> Option<usize> {
    edges
        .iter()
        .map(|&(s, d)| s.max(d))
        .max()
        .map(|m| m as usize + 1)
}

/// Fill zeroed `offsets` (len N+1) and `targets` (len E) from `edges`.
///
/// Uses `offsets[src]` itself as the write cursor, which leaves every entry
/// shifted one slot left; the final pass shifts them back.
fn fill_csr(edges: &[(NodeId, NodeId)], offsets: &mut [u64], targets: &mut [NodeId]) {
    for &(src, _) in edges {
        offsets[src as usize + 1] += 1;
    }
    prefix_sum(offsets);

    for &(src, dst) in edges {
        let cursor = &mut offsets[src as usize];
        targets[*cursor as usize] = dst;
        *cursor += 1;
    }

    for i in (1..offsets.len()).rev() {
        offsets[i] = offsets[i - 1];
    }
    offsets[0] = 0;
}

/// Turn `counts[i + 1] = degree(i)` into offsets in place.
pub(crate) fn prefix_sum(counts: &mut [u64]) {
    for i in 1..counts.len() {
        counts[i] += counts[i - 1];
    }
}
