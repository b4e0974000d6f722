//! Functional module detection by greedy modularity maximization.
//!
//! # Algorithm
//!
//! Clauset–Newman–Moore agglomeration on the unweighted graph:
//!
//! 1. Start with every node in its own community.
//! 2. For each pair of adjacent communities compute
//!    `ΔQ = 2 (e_ij − a_i a_j)`, where `e_ij` is the fraction of edge ends
//!    joining them and `a_i` is the fraction of edge ends in community `i`.
//! 3. Merge the pair with the largest gain while that gain is positive.
//!
//! Self-loops do not participate. Only adjacent pairs are candidates, so
//! disconnected components are never merged.
//!
//! # Determinism
//!
//! A community's representative is its smallest member label. Gains within
//! `1e-12` of each other are ties and resolve to the pair whose
//! `(smaller representative, larger representative)` tuple sorts first.
//! Final module ids are assigned by size descending, then representative
//! ascending, so id 0 is always the largest module.
//!
//! # Degenerate input
//!
//! A graph with no edges between distinct nodes, or a non-finite gain,
//! yields one module per node and a `warn!`. Detection never fails.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::graph::InteractionGraph;

/// Gains closer than this are treated as equal.
const GAIN_EPSILON: f64 = 1e-12;

/// Community assignment for every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Module id per node, indexed by node index.
    pub membership: Vec<usize>,
    pub module_count: usize,
    /// Newman modularity of the final partition.
    pub modularity: f64,
    /// True when the singleton fallback was used.
    pub degenerate: bool,
}

impl Partition {
    fn singletons(g: &InteractionGraph) -> Self {
        let mut order: Vec<(usize, &str)> = g
            .graph
            .node_indices()
            .filter_map(|idx| Some((idx.index(), g.label(idx)?)))
            .collect();
        order.sort_by(|a, b| a.1.cmp(b.1));

        let mut membership = vec![0; g.node_count()];
        for (module, (node, _)) in order.iter().enumerate() {
            membership[*node] = module;
        }
        Self {
            module_count: membership.len(),
            membership,
            modularity: 0.0,
            degenerate: true,
        }
    }

    /// Members of each module as node indices, by module id.
    #[must_use]
    pub fn modules(&self) -> Vec<Vec<usize>> {
        let mut modules = vec![Vec::new(); self.module_count];
        for (node, &module) in self.membership.iter().enumerate() {
            modules[module].push(node);
        }
        modules
    }
}

#[derive(Debug)]
struct Community {
    members: Vec<usize>,
    representative: String,
    /// Sum of member degrees (edge ends).
    degree: f64,
    /// Edges with both ends inside.
    internal: f64,
}

/// Partition `g` into modules.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count(), edges = g.edge_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn detect(g: &InteractionGraph) -> Partition {
    let n = g.node_count();
    if n == 0 {
        return Partition {
            membership: Vec::new(),
            module_count: 0,
            modularity: 0.0,
            degenerate: false,
        };
    }

    let m = g.non_loop_edge_count();
    if m == 0 {
        warn!(nodes = n, "no edges between distinct nodes, using one module per node");
        return Partition::singletons(g);
    }
    let two_m = 2.0 * m as f64;

    let mut communities: Vec<Option<Community>> = Vec::with_capacity(n);
    let mut adjacency: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
    for idx in g.graph.node_indices() {
        let i = idx.index();
        for neighbor in g.neighbors(idx) {
            *adjacency[i].entry(neighbor.index()).or_default() += 1.0;
        }
        communities.push(Some(Community {
            members: vec![i],
            representative: g.label(idx).unwrap_or_default().to_string(),
            degree: g.degree(idx) as f64,
            internal: 0.0,
        }));
    }

    let mut merges = 0_usize;
    loop {
        let mut best: Option<(f64, usize, usize)> = None;

        for (i, links) in adjacency.iter().enumerate() {
            let Some(ci) = communities[i].as_ref() else {
                continue;
            };
            for (&j, &between) in links.range(i + 1..) {
                let Some(cj) = communities[j].as_ref() else {
                    continue;
                };
                let gain = 2.0 * (between / two_m - (ci.degree / two_m) * (cj.degree / two_m));
                if !gain.is_finite() {
                    warn!(i, j, "non-finite modularity gain, using one module per node");
                    return Partition::singletons(g);
                }

                let replace = match best {
                    None => true,
                    Some((best_gain, bi, bj)) => {
                        gain > best_gain + GAIN_EPSILON
                            || ((gain - best_gain).abs() <= GAIN_EPSILON
                                && pair_key(&communities, i, j) < pair_key(&communities, bi, bj))
                    }
                };
                if replace {
                    best = Some((gain, i, j));
                }
            }
        }

        match best {
            Some((gain, i, j)) if gain > GAIN_EPSILON => {
                merge(&mut communities, &mut adjacency, i, j);
                merges += 1;
            }
            _ => break,
        }
    }

    let mut alive: Vec<Community> = communities.into_iter().flatten().collect();
    alive.sort_by(|a, b| {
        (Reverse(a.members.len()), &a.representative)
            .cmp(&(Reverse(b.members.len()), &b.representative))
    });

    let mut membership = vec![0; n];
    let mut modularity = 0.0;
    for (module, community) in alive.iter().enumerate() {
        for &node in &community.members {
            membership[node] = module;
        }
        let share = community.degree / two_m;
        modularity += community.internal / m as f64 - share * share;
    }

    debug!(merges, modules = alive.len(), modularity, "module detection finished");
    Partition {
        membership,
        module_count: alive.len(),
        modularity,
        degenerate: false,
    }
}

/// `(smaller representative, larger representative)` of two communities.
fn pair_key(communities: &[Option<Community>], i: usize, j: usize) -> (&str, &str) {
    let a = communities[i]
        .as_ref()
        .map_or("", |c| c.representative.as_str());
    let b = communities[j]
        .as_ref()
        .map_or("", |c| c.representative.as_str());
    if a <= b { (a, b) } else { (b, a) }
}

/// Fold community `j` into community `i`.
fn merge(
    communities: &mut [Option<Community>],
    adjacency: &mut [BTreeMap<usize, f64>],
    i: usize,
    j: usize,
) {
    let Some(absorbed) = communities[j].take() else {
        return;
    };
    let links = std::mem::take(&mut adjacency[j]);
    let between = links.get(&i).copied().unwrap_or_default();

    for (&other, &weight) in &links {
        if other == i {
            continue;
        }
        *adjacency[i].entry(other).or_default() += weight;
        adjacency[other].remove(&j);
        *adjacency[other].entry(i).or_default() += weight;
    }
    adjacency[i].remove(&j);

    if let Some(target) = communities[i].as_mut() {
        target.members.extend(absorbed.members);
        if absorbed.representative < target.representative {
            target.representative = absorbed.representative;
        }
        target.degree += absorbed.degree;
        target.internal += absorbed.internal + between;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
