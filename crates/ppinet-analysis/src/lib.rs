#![forbid(unsafe_code)]
//! ppinet-analysis library.
//!
//! Builds the protein interaction graph, scores every node, partitions the
//! graph into functional modules, and annotates the result from the
//! knowledge cache. [`explore::Explorer`] chains this with enrichment and
//! the evidence fetch.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Determinism**: node and edge order follow record order; nothing
//!   iterates a `HashMap` when producing output.

pub mod community;
pub mod explore;
pub mod graph;
pub mod metrics;
pub mod pipeline;

pub use explore::{Exploration, Explorer, ReviewTicket};
pub use graph::InteractionGraph;
pub use pipeline::{AnalysisResult, analyze};
