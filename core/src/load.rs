//! Edge-list loader.
//!
//! Two streaming passes over the file: the first finds the node count and
//! per-source out-degrees, the second scatters destinations into their
//! source's slot range. Peak memory is the final CSR arrays plus one cursor
//! per node; the edge list itself is never buffered.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::LoadOptions;
use crate::error::{LoadError, LoadResult};
use crate::graph::{self, CsrGraph, NodeId};

/// Counters gathered while loading, beyond the graph itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Blank and comment lines.
    pub skipped_lines: usize,
}

enum ParsedLine {
    Skip,
    Edge(NodeId, NodeId),
}

/// Parse an edge-list file into a [`CsrGraph`].
///
/// Nothing is returned unless the whole file parsed, so a failure never
/// yields a partially built graph.
pub fn load_edge_list(path: &Path, options: &LoadOptions) -> LoadResult<(CsrGraph, LoadStats)> {
    // Pass 1: node count and out-degree per source (stored at src + 1 so the
    // prefix sum below turns it into offsets in place). The memory cap is
    // enforced per edge, before `counts` is allowed to grow.
    let mut counts: Vec<u64> = Vec::new();
    let mut max_id: Option<NodeId> = None;
    let mut edge_count: usize = 0;

    let skipped_lines = scan(path, options, |_, src, dst| {
        let seen_max = max_id.map_or(src.max(dst), |m| m.max(src).max(dst));
        graph::check_memory(seen_max as usize + 1, edge_count + 1, options.max_memory_mb)?;

        let needed = src as usize + 2;
        if counts.len() < needed {
            grow_zeroed(&mut counts, needed)?;
        }
        counts[src as usize + 1] += 1;
        max_id = Some(seen_max);
        edge_count += 1;
        Ok(())
    })?;

    let node_count = max_id.map_or(0, |m| m as usize + 1);
    debug!(
        node_count,
        edge_count,
        skipped_lines,
        "load.first_pass"
    );

    let stats = LoadStats { skipped_lines };
    if node_count == 0 {
        return Ok((CsrGraph::new(), stats));
    }

    grow_zeroed(&mut counts, node_count + 1)?;
    graph::prefix_sum(&mut counts);
    let offsets = counts;

    let mut targets = graph::try_zeroed::<NodeId>(edge_count, "targets")?;

    let mut cursors: Vec<u64> = Vec::new();
    cursors
        .try_reserve_exact(node_count)
        .map_err(|_| LoadError::OutOfMemory { what: "cursors", len: node_count })?;
    cursors.extend_from_slice(&offsets[..node_count]);

    // Pass 2: place each destination at its source's next free slot.
    let mut placed: usize = 0;
    let mut last_line: usize = 0;
    scan(path, options, |line, src, dst| {
        last_line = line;
        let (s, d) = (src as usize, dst as usize);
        if s >= node_count || d >= node_count || placed == edge_count {
            return Err(LoadError::SourceChanged { line });
        }
        let slot = cursors[s];
        if slot >= offsets[s + 1] {
            return Err(LoadError::SourceChanged { line });
        }
        targets[slot as usize] = dst;
        cursors[s] = slot + 1;
        placed += 1;
        Ok(())
    })?;

    if placed != edge_count {
        return Err(LoadError::SourceChanged { line: last_line + 1 });
    }

    Ok((CsrGraph::from_parts(offsets, targets), stats))
}

/// Stream `path`, invoking `on_edge(line_number, src, dst)` for every edge.
/// Returns the number of skipped lines.
fn scan<F>(path: &Path, options: &LoadOptions, mut on_edge: F) -> LoadResult<usize>
where
    F: FnMut(usize, NodeId, NodeId) -> LoadResult<()>,
{
    let file = File::open(path).map_err(|source| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::with_capacity(1 << 16, file);

    let mut buf: Vec<u8> = Vec::with_capacity(64);
    let mut line_no: usize = 0;
    let mut skipped: usize = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let text = std::str::from_utf8(&buf).map_err(|_| LoadError::MalformedLine {
            line: line_no,
            content: String::from_utf8_lossy(&buf).trim_end().to_string(),
        })?;

        match parse_line(text, line_no, options)? {
            ParsedLine::Skip => skipped += 1,
            ParsedLine::Edge(src, dst) => on_edge(line_no, src, dst)?,
        }
    }

    Ok(skipped)
}

fn parse_line(text: &str, line: usize, options: &LoadOptions) -> LoadResult<ParsedLine> {
    let trimmed = text.trim();
    match trimmed.chars().next() {
        None => return Ok(ParsedLine::Skip),
        Some(c) if options.is_comment(c) => return Ok(ParsedLine::Skip),
        Some(_) => {}
    }

    let malformed = || LoadError::MalformedLine {
        line,
        content: trimmed.to_string(),
    };

    let mut tokens = trimmed.split_whitespace();
    let (Some(src), Some(dst), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let src = parse_id(src, line).ok_or_else(malformed)??;
    let dst = parse_id(dst, line).ok_or_else(malformed)??;
    Ok(ParsedLine::Edge(src, dst))
}

/// `None` when the token is not an integer at all; `Some(Err)` when it is an
/// integer but not a usable id (negative or wider than [`NodeId`]).
fn parse_id(token: &str, line: usize) -> Option<LoadResult<NodeId>> {
    let invalid = || LoadError::InvalidNodeId {
        line,
        token: token.to_string(),
    };

    if is_digits(token) {
        return Some(token.parse::<NodeId>().map_err(|_| invalid()));
    }
    match token.strip_prefix('-') {
        Some(rest) if is_digits(rest) => Some(Err(invalid())),
        _ => None,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn grow_zeroed(v: &mut Vec<u64>, len: usize) -> LoadResult<()> {
    if v.len() >= len {
        return Ok(());
    }
    v.try_reserve(len - v.len())
        .map_err(|_| LoadError::OutOfMemory { what: "degree counts", len })?;
    v.resize(len, 0);
    Ok(())
}
