//! Centrality metrics for the interaction graph.
//!
//! # Overview
//!
//! - **Degree centrality** (`degree`): how many distinct partners a protein
//!   has, relative to the most it could have. High values mark hubs.
//! - **Betweenness centrality** (`betweenness`): how often a protein lies on
//!   shortest paths between other pairs. High values mark bottlenecks.
//!
//! # Usage
//!
//! Every metric returns a `Vec` indexed by `NodeIndex::index()`, which is
//! the node's discovery order in [`InteractionGraph`]. All values are finite
//! and non-negative.
//!
//! ```rust,ignore
//! use ppinet_analysis::graph::InteractionGraph;
//! use ppinet_analysis::metrics::{betweenness::betweenness_centrality, degree::degree_centrality};
//!
//! let g = InteractionGraph::from_records(&records);
//! let dc = degree_centrality(&g);
//! let bc = betweenness_centrality(&g);
//! ```
//!
//! [`InteractionGraph`]: crate::graph::InteractionGraph

pub mod betweenness;
pub mod degree;
