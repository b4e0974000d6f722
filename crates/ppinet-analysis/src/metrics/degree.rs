//! Degree centrality.
//!
//! `deg(v) / (|V| - 1)` where `deg` counts distinct non-self neighbours.
//! Every score is 0 when the graph has at most one node.
//!
//! A self-loop adds nothing to `deg`. This differs from the usual
//! multigraph convention where a loop counts twice.

use petgraph::visit::NodeIndexable;

use crate::graph::InteractionGraph;

/// Per-node degree scores, indexed by node index.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeCentrality {
    /// Distinct non-self neighbour count. Self-loops count 0, not 2.
    pub raw: Vec<usize>,
    /// `raw / (n - 1)`, in `[0, 1]`.
    pub normalized: Vec<f64>,
}

/// Compute raw and normalized degree for every node.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(g: &InteractionGraph) -> DegreeCentrality {
    let n = g.node_count();
    let mut raw = vec![0; n];
    for idx in g.graph.node_indices() {
        raw[g.graph.to_index(idx)] = g.degree(idx);
    }

    let normalized = if n <= 1 {
        vec![0.0; n]
    } else {
        let denom = (n - 1) as f64;
        raw.iter().map(|&d| d as f64 / denom).collect()
    };

    DegreeCentrality { raw, normalized }
}
