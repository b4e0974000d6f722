#![forbid(unsafe_code)]
//! ppinet-core library.
//!
//! Owns everything that touches the outside world: the `SQLite` knowledge
//! cache, the classifier and interaction-evidence collaborators, and the
//! enrichment orchestrator that populates the cache.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types. Errors a caller must
//!   branch on are [`error::PpiError`] values carried inside the `anyhow`
//!   chain.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod classify;
pub mod config;
pub mod db;
pub mod drugs;
pub mod enrich;
pub mod error;
pub mod evidence;
pub mod model;
pub mod seed;
pub mod symbol;

pub use cache::KnowledgeCache;
pub use enrich::{EnrichmentOutcome, Orchestrator};
pub use error::PpiError;
pub use evidence::InteractionRecord;
