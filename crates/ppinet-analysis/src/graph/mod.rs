//! Interaction graph module.
//!
//! # Overview
//!
//! [`InteractionGraph`] is the undirected, weighted graph every analysis
//! stage consumes. It is rebuilt from interaction records on each request.
//!
//! ```text
//! Vec<InteractionRecord>
//!        ↓  build::InteractionGraph::from_records()
//! InteractionGraph (UnGraph, labels in discovery order)
//!        ↓  metrics::{degree, betweenness}   community::detect()
//! per-node scores and module ids, indexed by NodeIndex
//! ```
//!
//! Node indices follow label discovery order and edge indices follow first
//! insertion order, so every downstream output is deterministic for a given
//! record list.
//!
//! [`InteractionGraph::content_hash`] is a BLAKE3 hash of the sorted edge
//! list and identifies the network independent of record order.

pub mod build;

pub use build::InteractionGraph;
