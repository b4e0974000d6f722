//! Graph → metrics → modules → annotation.
//!
//! [`analyze`] is the single entry point. It never fails on graph shape:
//! an empty interaction list is a valid, empty result. The only error is a
//! failed category lookup against the knowledge cache.
//!
//! Floating-point output is rounded once, here, so two runs over the same
//! input and cache serialize to identical bytes.

use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::{Context, Result};
use ppinet_core::model::UNKNOWN_CATEGORY;
use ppinet_core::symbol::normalize_gene_list;
use ppinet_core::{InteractionRecord, KnowledgeCache};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::community;
use crate::graph::InteractionGraph;
use crate::metrics::betweenness::betweenness_centrality;
use crate::metrics::degree::degree_centrality;

/// Number of entries in each top list.
pub const TOP_N: usize = 5;

/// One node of the result with its metrics and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedNode {
    pub id: String,
    /// Degree centrality, rounded to 4 decimals.
    pub degree: f64,
    /// Betweenness centrality, rounded to 4 decimals.
    pub betweenness: f64,
    pub module: usize,
    /// Distinct interaction partners other than the node itself. A
    /// self-interaction is kept as an edge but adds 0 here, not 2.
    pub node_degree: usize,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEdge {
    pub source: String,
    pub target: String,
    /// Normalized confidence, rounded to 3 decimals.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEntry {
    pub gene: String,
    pub degree: usize,
    pub centrality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckEntry {
    pub gene: String,
    pub betweenness: f64,
}

/// Summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub top_hubs: Vec<HubEntry>,
    pub top_bottlenecks: Vec<BottleneckEntry>,
    pub modules_detected: usize,
    pub genes_found: usize,
    pub genes_not_found: usize,
}

/// The complete annotated network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub nodes: Vec<AnnotatedNode>,
    pub edges: Vec<AnnotatedEdge>,
    pub stats: NetworkStats,
    /// Requested genes present in the network, in request order.
    pub genes_found: Vec<String>,
    /// Requested genes absent from the network, in request order.
    pub genes_not_found: Vec<String>,
    /// BLAKE3 hash of the network's edge list.
    pub content_hash: String,
}

/// Build the network from `records` and annotate it.
///
/// `requested` is normalized and deduplicated before the found/not-found
/// split. Node categories come from one batched cache lookup; uncached
/// nodes are `"Unknown"`.
///
/// # Errors
///
/// Returns an error if the category lookup fails.
#[instrument(skip_all, fields(records = records.len(), requested = requested.len()))]
pub fn analyze<S: AsRef<str>>(
    records: &[InteractionRecord],
    requested: &[S],
    cache: &KnowledgeCache,
) -> Result<AnalysisResult> {
    let requested = normalize_gene_list(requested);
    let graph = InteractionGraph::from_records(records);

    if graph.edge_count() == 0 {
        info!("no interactions, returning empty network");
        return Ok(AnalysisResult {
            stats: NetworkStats {
                genes_not_found: requested.len(),
                ..NetworkStats::default()
            },
            genes_not_found: requested,
            content_hash: graph.content_hash,
            ..AnalysisResult::default()
        });
    }

    let degree = degree_centrality(&graph);
    let betweenness = betweenness_centrality(&graph);
    let partition = community::detect(&graph);

    let labels: Vec<&str> = graph.labels().collect();
    let categories = cache
        .lookup_genes(&labels)
        .context("look up node categories")?;

    let nodes: Vec<AnnotatedNode> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| AnnotatedNode {
            id: (*label).to_string(),
            degree: round_to(degree.normalized[i], 4),
            betweenness: round_to(betweenness[i], 4),
            module: partition.membership[i],
            node_degree: degree.raw[i],
            category: categories
                .get(*label)
                .map_or_else(|| UNKNOWN_CATEGORY.to_string(), |g| g.category.clone()),
        })
        .collect();

    let edges: Vec<AnnotatedEdge> = graph
        .edges()
        .map(|(source, target, weight)| AnnotatedEdge {
            source: source.to_string(),
            target: target.to_string(),
            score: round_to(weight, 3),
        })
        .collect();

    let present: HashSet<&str> = labels.iter().copied().collect();
    let (genes_found, genes_not_found): (Vec<String>, Vec<String>) = requested
        .into_iter()
        .partition(|gene| present.contains(gene.as_str()));

    let stats = NetworkStats {
        total_nodes: graph.node_count(),
        total_edges: graph.edge_count(),
        top_hubs: top_hubs(&nodes),
        top_bottlenecks: top_bottlenecks(&nodes),
        modules_detected: partition.module_count,
        genes_found: genes_found.len(),
        genes_not_found: genes_not_found.len(),
    };

    info!(
        nodes = stats.total_nodes,
        edges = stats.total_edges,
        modules = stats.modules_detected,
        "network analyzed"
    );

    Ok(AnalysisResult {
        nodes,
        edges,
        stats,
        genes_found,
        genes_not_found,
        content_hash: graph.content_hash,
    })
}

/// Top nodes by raw degree; ties keep discovery order.
fn top_hubs(nodes: &[AnnotatedNode]) -> Vec<HubEntry> {
    let mut ranked: Vec<&AnnotatedNode> = nodes.iter().collect();
    ranked.sort_by(|a, b| b.node_degree.cmp(&a.node_degree));
    ranked
        .into_iter()
        .take(TOP_N)
        .map(|n| HubEntry {
            gene: n.id.clone(),
            degree: n.node_degree,
            centrality: n.degree,
        })
        .collect()
}

/// Top nodes by betweenness; ties keep discovery order.
fn top_bottlenecks(nodes: &[AnnotatedNode]) -> Vec<BottleneckEntry> {
    let mut ranked: Vec<&AnnotatedNode> = nodes.iter().collect();
    ranked.sort_by(|a, b| {
        b.betweenness
            .partial_cmp(&a.betweenness)
            .unwrap_or(Ordering::Equal)
    });
    ranked
        .into_iter()
        .take(TOP_N)
        .map(|n| BottleneckEntry {
            gene: n.id.clone(),
            betweenness: n.betweenness,
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::float_cmp)]
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Collapse -0.0 so serialized output never shows a sign.
    if rounded == 0.0 { 0.0 } else { rounded }
}
