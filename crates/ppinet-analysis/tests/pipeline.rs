//! Analysis pipeline over an in-memory knowledge cache.

use ppinet_analysis::pipeline::analyze;
use ppinet_core::model::GeneInput;
use ppinet_core::{InteractionRecord, KnowledgeCache};

fn cache_with(genes: &[(&str, &str)]) -> KnowledgeCache {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let inputs: Vec<GeneInput> = genes
        .iter()
        .map(|(symbol, category)| GeneInput {
            symbol: (*symbol).to_string(),
            category_id: cache.lookup_categories(&[*category]).expect("lookup")[*category].id,
            description: String::new(),
        })
        .collect();
    cache.bulk_upsert_genes(&inputs).expect("seed");
    cache
}

fn p53_network() -> Vec<InteractionRecord> {
    vec![
        InteractionRecord::new("TP53", "MDM2", 0.999),
        InteractionRecord::new("TP53", "CDKN1A", 0.987),
        InteractionRecord::new("MDM2", "CDKN1A", 0.612),
        InteractionRecord::new("TP53", "ATM", 0.95),
        InteractionRecord::new("ATM", "CHEK2", 0.9),
        InteractionRecord::new("EGFR", "GRB2", 0.999),
        InteractionRecord::new("GRB2", "SOS1", 0.998),
        InteractionRecord::new("SOS1", "EGFR", 0.7),
    ]
}

#[test]
fn empty_interactions_yield_empty_valid_result() {
    let cache = KnowledgeCache::in_memory().expect("cache");
    let result = analyze(&[], &["tp53", "MDM2", "TP53"], &cache).expect("analyze");

    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
    assert_eq!(result.stats.total_nodes, 0);
    assert_eq!(result.stats.total_edges, 0);
    assert_eq!(result.stats.modules_detected, 0);
    assert!(result.stats.top_hubs.is_empty());
    assert!(result.stats.top_bottlenecks.is_empty());
    assert_eq!(result.genes_not_found, ["TP53", "MDM2"]);
    assert_eq!(result.stats.genes_not_found, 2);
    assert!(result.genes_found.is_empty());
}

#[test]
fn nodes_are_annotated_from_cache() {
    let cache = cache_with(&[("TP53", "Tumor Suppressor"), ("EGFR", "Oncogene")]);
    let result = analyze(&p53_network(), &["TP53", "EGFR", "BRCA1"], &cache).expect("analyze");

    let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["TP53", "MDM2", "CDKN1A", "ATM", "CHEK2", "EGFR", "GRB2", "SOS1"]);

    let tp53 = &result.nodes[0];
    assert_eq!(tp53.category, "Tumor Suppressor");
    assert_eq!(tp53.node_degree, 3);
    assert!((tp53.degree - 0.4286).abs() < 1e-12);
    assert_eq!(result.nodes[1].category, "Unknown");
    assert_eq!(result.nodes[5].category, "Oncogene");

    assert_eq!(result.genes_found, ["TP53", "EGFR"]);
    assert_eq!(result.genes_not_found, ["BRCA1"]);
    assert_eq!(result.stats.genes_found, 2);
    assert_eq!(result.stats.genes_not_found, 1);
}

#[test]
fn edges_keep_insertion_order_and_round_scores() {
    let cache = KnowledgeCache::in_memory().expect("cache");
    let records = vec![
        InteractionRecord::new("A", "B", 123.0),
        InteractionRecord::new("B", "C", 0.12345),
        InteractionRecord::new("b", "a", 0.5),
    ];
    let result = analyze(&records, &["A"], &cache).expect("analyze");

    assert_eq!(result.edges.len(), 2);
    assert_eq!(result.edges[0].source, "A");
    assert_eq!(result.edges[0].target, "B");
    assert!((result.edges[0].score - 0.5).abs() < 1e-12, "last write wins");
    assert!((result.edges[1].score - 0.123).abs() < 1e-12);
}

#[test]
fn stats_report_hubs_bottlenecks_and_modules() {
    let cache = KnowledgeCache::in_memory().expect("cache");
    let result = analyze(&p53_network(), &["TP53"], &cache).expect("analyze");

    assert_eq!(result.stats.total_nodes, 8);
    assert_eq!(result.stats.total_edges, 8);
    assert_eq!(result.stats.top_hubs.len(), 5);
    assert_eq!(result.stats.top_hubs[0].gene, "TP53");
    assert_eq!(result.stats.top_hubs[0].degree, 3);
    assert_eq!(result.stats.top_bottlenecks[0].gene, "TP53");
    assert!(result.stats.modules_detected >= 2);

    let tp53_module = result.nodes[0].module;
    let egfr_module = result.nodes[5].module;
    assert_ne!(tp53_module, egfr_module);
}

#[test]
fn repeated_runs_serialize_identically() {
    let cache = cache_with(&[("TP53", "Tumor Suppressor")]);
    let first = analyze(&p53_network(), &["TP53", "EGFR"], &cache).expect("first");
    let second = analyze(&p53_network(), &["TP53", "EGFR"], &cache).expect("second");

    let a = serde_json::to_vec(&first).expect("serialize");
    let b = serde_json::to_vec(&second).expect("serialize");
    assert_eq!(a, b);
    assert!(first.content_hash.starts_with("blake3:"));
}

#[test]
fn self_interaction_is_an_edge_but_not_a_partner() {
    let cache = KnowledgeCache::in_memory().expect("cache");
    let records = vec![
        InteractionRecord::new("TP53", "TP53", 0.9),
        InteractionRecord::new("TP53", "MDM2", 0.9),
    ];
    let result = analyze(&records, &["TP53"], &cache).expect("analyze");

    assert_eq!(result.stats.total_edges, 2);
    assert_eq!(result.nodes[0].id, "TP53");
    assert_eq!(result.nodes[0].node_degree, 1);
    assert!((result.nodes[0].degree - 1.0).abs() < 1e-12);
    assert_eq!(result.stats.top_hubs[0].degree, 1);
}
