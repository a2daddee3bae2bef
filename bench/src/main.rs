use std::collections::VecDeque;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use neuronet_core::{GraphStore, NodeId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run all generators and benchmark each
    All,
    /// Fractal branching tree (deep paths)
    Lsystem,
    /// Preferential attachment via edge sampling (hub-and-spoke)
    Scalefree,
    /// Watts-Strogatz ring lattice + shortcuts
    Smallworld,
    /// Erdos-Renyi uniform random edges
    Random,
    /// Two dense cliques connected by a thin bridge
    Barbell,
    /// Diffusion-limited aggregation (organic branching)
    Dla,
    /// Load an existing edge-list file (requires --file)
    File,
}

#[derive(Debug, Parser)]
#[command(name = "neuronet-bench", about = "Benchmark the neuronet-core graph engine")]
struct Args {
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Target node count for generated graphs
    #[arg(long, default_value_t = 5_000_000)]
    nodes: u32,

    /// Edge-list file for `file` mode
    #[arg(long)]
    file: Option<PathBuf>,

    /// BFS start node
    #[arg(long, default_value_t = 0)]
    start: NodeId,

    /// Print the graph status as JSON after each load
    #[arg(long)]
    json: bool,
}

type Generator = fn(u32) -> Vec<(NodeId, NodeId)>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let store = GraphStore::from_env();

    println!("neuronet-bench");
    println!("==============");
    println!();

    if args.mode == Mode::File {
        let Some(path) = args.file.as_deref() else {
            bail!("`file` mode needs --file <PATH>");
        };
        return run_benchmark(&store, "Edge-list file", path, &args);
    }
    if args.nodes < 2 {
        bail!("--nodes must be at least 2");
    }

    let generators: Vec<(&str, Generator)> = match args.mode {
        Mode::Lsystem => vec![("L-system tree", gen_lsystem)],
        Mode::Scalefree => vec![("Scale-free (edge sampling)", gen_scale_free)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        Mode::Random => vec![("Erdos-Renyi random", gen_random)],
        Mode::Barbell => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        Mode::Dla => vec![("DLA (organic branching)", gen_dla)],
        Mode::All | Mode::File => vec![
            ("L-system tree", gen_lsystem as Generator),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
    };

    for (name, generator) in generators {
        let t = Instant::now();
        let edges = generator(args.nodes);
        let file = write_edge_list(&edges)?;
        println!(
            "Generated {} edges in {:.2}s",
            edges.len(),
            t.elapsed().as_secs_f64()
        );
        drop(edges);
        run_benchmark(&store, name, file.path(), &args)?;
    }

    Ok(())
}

fn write_edge_list(edges: &[(NodeId, NodeId)]) -> Result<tempfile::NamedTempFile> {
    let file = tempfile::NamedTempFile::new().context("creating temp edge list")?;
    let mut out = BufWriter::new(file.as_file());
    writeln!(out, "# generated by neuronet-bench")?;
    for (src, dst) in edges {
        writeln!(out, "{src} {dst}")?;
    }
    out.flush()?;
    drop(out);
    Ok(file)
}

fn run_benchmark(store: &GraphStore, name: &str, path: &Path, args: &Args) -> Result<()> {
    println!("--- {} ---", name);

    let summary = store
        .load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    println!(
        "Loaded in {:.2}s: {} nodes, {} edges, ~{}MB",
        summary.load_time_ms / 1000.0,
        summary.node_count,
        summary.edge_count,
        summary.memory_mb
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&store.status())?);
    }

    let t = Instant::now();
    let hub = store.max_degree_node()?;
    println!(
        "Max-degree node: {} (degree {}) in {:.1}ms",
        hub,
        store.degree(hub)?,
        t.elapsed().as_secs_f64() * 1000.0
    );

    println!();
    println!("{:>8} {:>12} {:>10}", "depth", "found", "time");
    println!("{:->8} {:->12} {:->10}", "", "", "");

    let node_count = store.node_count();
    for depth in [1, 2, 3, 5, 10, 20, 50] {
        let t = Instant::now();
        let found = store.bfs(args.start, depth)?;
        let elapsed = t.elapsed();
        println!(
            "{:>8} {:>12} {:>8.1}ms",
            depth,
            found.len(),
            elapsed.as_secs_f64() * 1000.0
        );
        // Stop if we already found everything
        if found.len() >= node_count {
            println!("{:>8} (entire graph reached)", "");
            break;
        }
    }

    let nodes = store.bfs(args.start, 2)?;
    let t = Instant::now();
    let edges = store.subgraph_edges(&nodes)?;
    println!();
    println!(
        "Subgraph (depth 2): {} nodes, {} edges in {:.1}ms",
        nodes.len(),
        edges.len(),
        t.elapsed().as_secs_f64() * 1000.0
    );
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Generators — all O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u32) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) % max as u64) as u32
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// L-system fractal tree: every node spawns three children, breadth first.
fn gen_lsystem(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let branching = 3u32;
    let mut edges = Vec::with_capacity(node_count as usize);
    let mut next_id: u32 = 1;
    let mut frontier: Vec<u32> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                edges.push((parent, next_id));
                next_frontier.push(next_id);
                next_id += 1;
            }
        }
        frontier = next_frontier;
    }

    edges
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge endpoint, so
/// nodes with more edges are more likely to be picked.
fn gen_scale_free(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let edges_per_node = 10u32;
    let mut edges = Vec::with_capacity(node_count as usize * edges_per_node as usize);
    let mut rng = FastRng::new(12345);
    let mut endpoints: Vec<u32> = Vec::with_capacity(node_count as usize * edges_per_node as usize * 2);

    let seed = 5u32.min(node_count);
    for i in 0..seed {
        for j in (i + 1)..seed {
            edges.push((i, j));
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        if endpoints.is_empty() {
            break;
        }
        for _ in 0..edges_per_node.min(new_node) {
            let target = endpoints[rng.next(endpoints.len() as u32) as usize];
            if target != new_node {
                edges.push((new_node, target));
                endpoints.push(new_node);
                endpoints.push(target);
            }
        }
    }

    edges
}

/// Small-world (Watts-Strogatz): ring lattice, each edge rewired with p=0.05.
fn gen_small_world(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let k = 10u32;
    let p = 0.05f64;
    let mut edges = Vec::with_capacity(node_count as usize * k as usize);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = ((i as u64 + j as u64) % node_count as u64) as u32;
            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                edges.push((i, if rewired != i { rewired } else { neighbor }));
            } else {
                edges.push((i, neighbor));
            }
        }
    }

    edges
}

/// Erdos-Renyi: ~10 uniform random edges per node, no self-loops.
fn gen_random(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let target_edges = node_count as usize * 10;
    let mut edges = Vec::with_capacity(target_edges);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            edges.push((from, to));
        }
    }

    edges
}

/// Barbell: two dense clusters joined by a chain of ten bridge nodes.
fn gen_barbell(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let bridge_len = 10u32;
    let clique_size = node_count.saturating_sub(bridge_len) / 2;
    if clique_size < 2 {
        return gen_lsystem(node_count);
    }
    let mut edges = Vec::with_capacity(clique_size as usize * 40 + bridge_len as usize);
    let mut rng = FastRng::new(99999);

    for i in 0..clique_size {
        for _ in 0..20u32.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                edges.push((i, target));
            }
        }
    }

    let bridge_start = clique_size;
    edges.push((clique_size - 1, bridge_start));
    for id in bridge_start + 1..bridge_start + bridge_len {
        edges.push((id - 1, id));
    }

    let b_start = bridge_start + bridge_len;
    edges.push((b_start - 1, b_start));
    for i in 0..clique_size {
        for _ in 0..20u32.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                edges.push((b_start + i, b_start + target));
            }
        }
    }

    edges
}

/// DLA (Diffusion-Limited Aggregation): each new node attaches to a recent
/// "surface" node, with an occasional second long-range link.
fn gen_dla(node_count: u32) -> Vec<(NodeId, NodeId)> {
    let mut edges = Vec::with_capacity(node_count as usize * 2);
    let mut rng = FastRng::new(77777);

    let surface_max = 10_000usize;
    let mut surface: VecDeque<u32> = VecDeque::with_capacity(surface_max + 1);
    surface.push_back(0);

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u32) as usize];
        edges.push((new_node, attach_to));

        // 10% chance of a second connection (creates loops / shortcuts)
        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            if other != attach_to {
                edges.push((new_node, other));
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_id(edges: &[(NodeId, NodeId)]) -> u32 {
        edges.iter().map(|&(s, d)| s.max(d)).max().unwrap()
    }

    #[test]
    fn test_generators_stay_in_range() {
        let all: [Generator; 6] = [
            gen_lsystem,
            gen_scale_free,
            gen_small_world,
            gen_random,
            gen_barbell,
            gen_dla,
        ];
        for generator in all {
            let edges = generator(500);
            assert!(!edges.is_empty());
            assert!(max_id(&edges) < 500);
        }
    }

    #[test]
    fn test_lsystem_is_tree() {
        let edges = gen_lsystem(40);
        assert_eq!(edges.len(), 39);
        assert_eq!(&edges[..3], &[(0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn test_written_file_loads() {
        let edges = gen_dla(200);
        let file = write_edge_list(&edges).unwrap();
        let store = GraphStore::new();
        let summary = store.load(file.path()).unwrap();
        assert_eq!(summary.edge_count, edges.len());
        assert_eq!(summary.skipped_lines, 1);
    }
}
