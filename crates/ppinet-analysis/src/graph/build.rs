//! Graph construction from interaction records.
//!
//! ## Labels
//!
//! Node labels are trimmed and uppercased. A record with a blank endpoint
//! has nothing to attach to and is skipped.
//!
//! ## Weights
//!
//! Scores above 1 are taken to be on the 0–1000 evidence scale and divided
//! by 1000. Negative or non-finite scores become 0.
//!
//! ## Duplicates
//!
//! At most one edge exists per unordered pair. A later record for the same
//! pair overwrites the weight but keeps the edge's original position.
//! Self-loops are stored as edges but never count as neighbours.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use ppinet_core::InteractionRecord;
use ppinet_core::symbol::normalize_symbol;
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// InteractionGraph
// ---------------------------------------------------------------------------

/// An undirected weighted protein interaction graph.
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    /// Nodes are normalized gene labels; edge weights are in `[0, 1]`.
    pub graph: UnGraph<String, f64>,
    /// Mapping from label to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the sorted edge list.
    pub content_hash: String,
}

impl InteractionGraph {
    /// Build a graph from `records`. An empty slice yields an empty graph.
    #[must_use]
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn from_records(records: &[InteractionRecord]) -> Self {
        let mut graph = UnGraph::<String, f64>::default();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();
        let mut skipped = 0_usize;

        for record in records {
            let a = normalize_symbol(&record.node_a);
            let b = normalize_symbol(&record.node_b);
            if a.is_empty() || b.is_empty() {
                skipped += 1;
                continue;
            }

            let ia = *node_map
                .entry(a.clone())
                .or_insert_with(|| graph.add_node(a));
            let ib = *node_map
                .entry(b.clone())
                .or_insert_with(|| graph.add_node(b));

            // update_edge keeps the existing edge index, so insertion order
            // is that of the first occurrence.
            graph.update_edge(ia, ib, normalize_weight(record.score));
        }

        if skipped > 0 {
            debug!(skipped, "dropped records with blank labels");
        }

        let content_hash = compute_edge_hash(&graph);
        Self {
            graph,
            node_map,
            content_hash,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a label (normalized first).
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(&normalize_symbol(label)).copied()
    }

    /// Return the label of a node.
    #[must_use]
    pub fn label(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Node labels in discovery order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges as `(source, target, weight)` in first-insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.graph.edge_indices().filter_map(|e| self.edge(e))
    }

    fn edge(&self, e: EdgeIndex) -> Option<(&str, &str, f64)> {
        let (a, b) = self.graph.edge_endpoints(e)?;
        let weight = *self.graph.edge_weight(e)?;
        Some((self.label(a)?, self.label(b)?, weight))
    }

    /// Distinct neighbours of `idx`, excluding itself.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges(idx)
            .map(move |e| if e.source() == idx { e.target() } else { e.source() })
            .filter(move |&n| n != idx)
    }

    /// Number of distinct non-self neighbours of `idx`.
    #[must_use]
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.neighbors(idx).count()
    }

    /// Number of edges between distinct nodes.
    #[must_use]
    pub fn non_loop_edge_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|e| e.source() != e.target())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn normalize_weight(score: f64) -> f64 {
    if !score.is_finite() || score <= 0.0 {
        return 0.0;
    }
    if score > 1.0 { score / 1000.0 } else { score }
}

/// BLAKE3 hash of the edge list with each pair ordered and the list sorted.
fn compute_edge_hash(graph: &UnGraph<String, f64>) -> String {
    let mut edges: Vec<(&str, &str, u64)> = graph
        .edge_references()
        .map(|e| {
            let a = graph[e.source()].as_str();
            let b = graph[e.target()].as_str();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            (lo, hi, e.weight().to_bits())
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (a, b, weight) in edges {
        hasher.update(a.as_bytes());
        hasher.update(b"\x00");
        hasher.update(b.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(a: &str, b: &str, score: f64) -> InteractionRecord {
        InteractionRecord::new(a, b, score)
    }

    #[test]
    fn empty_records_produce_empty_graph() {
        let g = InteractionGraph::from_records(&[]);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn labels_are_normalized_and_deduplicated() {
        let g = InteractionGraph::from_records(&[rec(" tp53", "MDM2 ", 0.9), rec("Tp53", "egfr", 0.5)]);
        let labels: Vec<&str> = g.labels().collect();
        assert_eq!(labels, ["TP53", "MDM2", "EGFR"]);
        assert!(g.node_index("tp53").is_some());
    }

    #[test]
    fn blank_labels_are_skipped() {
        let g = InteractionGraph::from_records(&[rec("", "MDM2", 0.9), rec("A", "  ", 0.1)]);
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn duplicate_pairs_keep_last_weight_and_first_position() {
        let g = InteractionGraph::from_records(&[
            rec("A", "B", 0.2),
            rec("B", "C", 0.3),
            rec("B", "A", 0.9),
        ]);
        assert_eq!(g.edge_count(), 2);
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges[0], ("A", "B", 0.9));
        assert_eq!(edges[1], ("B", "C", 0.3));
    }

    #[test]
    fn thousand_scale_scores_are_normalized() {
        let g = InteractionGraph::from_records(&[rec("A", "B", 850.0), rec("B", "C", -3.0)]);
        let weights: Vec<f64> = g.edges().map(|(_, _, w)| w).collect();
        assert!((weights[0] - 0.85).abs() < 1e-12);
        assert!(weights[1].abs() < f64::EPSILON);
    }

    #[test]
    fn self_loops_are_kept_but_not_neighbours() {
        let g = InteractionGraph::from_records(&[rec("A", "A", 0.5), rec("A", "B", 0.5)]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.non_loop_edge_count(), 1);
        let a = g.node_index("A").expect("A");
        assert_eq!(g.degree(a), 1);
    }

    #[test]
    fn content_hash_ignores_record_order_and_orientation() {
        let g1 = InteractionGraph::from_records(&[rec("A", "B", 0.5), rec("C", "B", 0.7)]);
        let g2 = InteractionGraph::from_records(&[rec("B", "C", 0.7), rec("b", "a", 0.5)]);
        assert_eq!(g1.content_hash, g2.content_hash);

        let g3 = InteractionGraph::from_records(&[rec("A", "B", 0.5), rec("C", "B", 0.8)]);
        assert_ne!(g1.content_hash, g3.content_hash);
    }
}
