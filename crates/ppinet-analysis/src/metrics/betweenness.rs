//! Betweenness centrality via Brandes' algorithm.
//!
//! # Algorithm
//!
//! Brandes (2001) for unweighted, undirected graphs:
//!
//! 1. For each source node `s`, run BFS to compute shortest-path counts
//!    and distances.
//! 2. Accumulate dependency scores in reverse BFS order (farthest nodes first).
//! 3. Sum the dependency scores across all source nodes.
//!
//! Every shortest path counts equally regardless of edge weight, and
//! self-loops are ignored. Complexity: O(V * E).
//!
//! # Normalization
//!
//! Summing over every source visits each unordered pair twice, so the raw
//! sum is halved and then scaled by `2 / ((n-1)(n-2))`. Together that is
//! one division by `(n-1)(n-2)`. Graphs with at most two nodes score 0
//! everywhere.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use petgraph::visit::NodeIndexable;
use tracing::instrument;

use crate::graph::InteractionGraph;

/// Compute normalized betweenness centrality, indexed by node index.
///
/// Disconnected nodes and nodes no shortest path passes through score 0.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn betweenness_centrality(g: &InteractionGraph) -> Vec<f64> {
    let n = g.node_count();
    if n <= 2 {
        return vec![0.0; n];
    }

    let graph = &g.graph;
    let mut cb: Vec<f64> = vec![0.0; n];

    for s in graph.node_indices() {
        let si = graph.to_index(s);

        // Nodes in order of discovery (farthest popped first).
        let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);

        // predecessors[w]: nodes immediately preceding w on shortest paths
        // from s.
        let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];

        // sigma[t]: number of shortest paths from s to t.
        let mut sigma: Vec<f64> = vec![0.0; n];
        sigma[si] = 1.0;

        // dist[t]: distance from s to t (-1 = unvisited).
        let mut dist: Vec<i64> = vec![-1; n];
        dist[si] = 0;

        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            let vi = graph.to_index(v);
            stack.push(v);

            for w in g.neighbors(v) {
                let wi = graph.to_index(w);

                if dist[wi] < 0 {
                    dist[wi] = dist[vi] + 1;
                    queue.push_back(w);
                }

                if dist[wi] == dist[vi] + 1 {
                    sigma[wi] += sigma[vi];
                    predecessors[wi].push(v);
                }
            }
        }

        let mut delta: Vec<f64> = vec![0.0; n];

        while let Some(w) = stack.pop() {
            let wi = graph.to_index(w);

            for &v in &predecessors[wi] {
                let vi = graph.to_index(v);
                if sigma[wi] > 0.0 {
                    delta[vi] += (sigma[vi] / sigma[wi]) * (1.0 + delta[wi]);
                }
            }

            if wi != si {
                cb[wi] += delta[wi];
            }
        }
    }

    let scale = ((n - 1) * (n - 2)) as f64;
    cb.into_iter()
        .map(|score| {
            let normalized = score / scale;
            if normalized.is_finite() && normalized > 0.0 {
                normalized
            } else {
                0.0
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
