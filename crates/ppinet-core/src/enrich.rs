//! Cache-population workflow.
//!
//! # Overview
//!
//! [`Orchestrator::enrich`] decides, for every requested symbol, whether
//! the knowledge cache already answers it or the classifier must be asked.
//! Each request ends in one of three outcomes:
//!
//! | Outcome                   | Classifier calls | Rows written            |
//! |---------------------------|------------------|-------------------------|
//! | `Resolved`                | 0                | 0                       |
//! | `CategoryReviewRequired`  | one per miss     | 0                       |
//! | `Committed`               | one per miss     | all misses, one tx      |
//!
//! `FetchPending` is the transient state while misses are being classified;
//! it is logged but never returned.
//!
//! A review is resolved by [`Orchestrator::commit`], which creates the
//! approved categories and writes the pending genes atomically. Submitting
//! the same gene list afterwards yields `Resolved`.
//!
//! # Fan-out
//!
//! Misses are classified on scoped worker threads pulling from a shared
//! cursor. At most `max_concurrency` classifier calls are in flight. A
//! failed or panicking call degrades to the default classification for that
//! symbol only; siblings keep running and every call is awaited before the
//! orchestrator continues.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cache::{CommitReport, KnowledgeCache};
use crate::classify::{Classification, Classifier, classify_or_default};
use crate::error::PpiError;
use crate::model::{DEFAULT_CATEGORY_COLOR, NewCategory, PendingGene};
use crate::symbol::{normalize_gene_list, normalize_symbol, title_case};

/// Where an enrichment request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentState {
    Resolved,
    FetchPending,
    CategoryReviewRequired,
    Committed,
}

/// Everything a reviewer needs to approve newly discovered categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Category names not yet in the cache, in first-seen order.
    pub new_categories: Vec<String>,
    /// Every freshly classified gene of the request, not only those in
    /// new categories.
    pub genes: Vec<PendingGene>,
}

/// Terminal result of [`Orchestrator::enrich`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Every symbol was already cached.
    Resolved,
    /// New categories were found; nothing was written.
    CategoryReviewRequired(PendingReview),
    /// Misses were classified into known categories and written.
    Committed(CommitReport),
}

impl EnrichmentOutcome {
    #[must_use]
    pub const fn state(&self) -> EnrichmentState {
        match self {
            Self::Resolved => EnrichmentState::Resolved,
            Self::CategoryReviewRequired(_) => EnrichmentState::CategoryReviewRequired,
            Self::Committed(_) => EnrichmentState::Committed,
        }
    }
}

/// Drives classification and cache population for gene lists.
pub struct Orchestrator<'a, C: Classifier + ?Sized> {
    classifier: &'a C,
    max_concurrency: usize,
    category_color: String,
}

impl<'a, C: Classifier + ?Sized> Orchestrator<'a, C> {
    /// `max_concurrency` of 0 is treated as 1.
    #[must_use]
    pub fn new(classifier: &'a C, max_concurrency: usize) -> Self {
        Self {
            classifier,
            max_concurrency: max_concurrency.max(1),
            category_color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }

    /// Color given to categories created by [`Orchestrator::commit`].
    #[must_use]
    pub fn with_category_color(mut self, color: impl Into<String>) -> Self {
        self.category_color = color.into();
        self
    }

    /// Resolve `genes` against the cache, classifying and committing misses
    /// when no new category needs review.
    ///
    /// # Errors
    ///
    /// [`PpiError::InvalidInput`] if no usable symbol remains after
    /// normalization; [`PpiError::CacheWrite`] if the commit rolls back.
    #[instrument(skip(self, cache, genes), fields(requested = genes.len()))]
    pub fn enrich<S: AsRef<str>>(
        &self,
        cache: &mut KnowledgeCache,
        genes: &[S],
    ) -> Result<EnrichmentOutcome> {
        let symbols = normalize_gene_list(genes);
        if symbols.is_empty() {
            return Err(PpiError::InvalidInput("gene list is empty".to_string()).into());
        }

        let cached = cache.lookup_genes(&symbols).context("look up cached genes")?;
        let missing: Vec<String> = symbols
            .into_iter()
            .filter(|s| !cached.contains_key(s))
            .collect();

        if missing.is_empty() {
            info!(state = ?EnrichmentState::Resolved, cached = cached.len(), "all genes cached");
            return Ok(EnrichmentOutcome::Resolved);
        }

        info!(
            state = ?EnrichmentState::FetchPending,
            cached = cached.len(),
            missing = missing.len(),
            "classifying cache misses"
        );
        let pending: Vec<PendingGene> = missing
            .iter()
            .zip(self.classify_all(&missing))
            .map(|(symbol, c)| PendingGene {
                symbol: symbol.clone(),
                category: c.category,
                description: c.description,
            })
            .collect();

        let new_categories = unknown_categories(cache, &pending)?;
        if !new_categories.is_empty() {
            info!(
                state = ?EnrichmentState::CategoryReviewRequired,
                new_categories = ?new_categories,
                "new categories need review"
            );
            return Ok(EnrichmentOutcome::CategoryReviewRequired(PendingReview {
                new_categories,
                genes: pending,
            }));
        }

        let report = cache.commit_enrichment(&[], &pending)?;
        info!(state = ?EnrichmentState::Committed, written = report.genes_written, "enrichment committed");
        Ok(EnrichmentOutcome::Committed(report))
    }

    /// Approve `approved` category names and commit `genes` in one
    /// transaction.
    ///
    /// Genes whose category is neither approved nor already cached are
    /// skipped and listed in the report.
    ///
    /// # Errors
    ///
    /// [`PpiError::CacheWrite`] if the transaction rolls back.
    #[instrument(skip(self, cache, approved, genes), fields(approved = approved.len(), genes = genes.len()))]
    pub fn commit<S: AsRef<str>>(
        &self,
        cache: &mut KnowledgeCache,
        approved: &[S],
        genes: &[PendingGene],
    ) -> Result<CommitReport> {
        let categories: Vec<NewCategory> = approved
            .iter()
            .map(|name| title_case(name.as_ref()))
            .filter(|name| !name.is_empty())
            .map(|name| NewCategory {
                name,
                color: self.category_color.clone(),
            })
            .collect();

        let report = cache.commit_enrichment(&categories, genes)?;
        info!(state = ?EnrichmentState::Committed, written = report.genes_written, "approved enrichment committed");
        Ok(report)
    }

    /// Extended detail for a cached gene, fetched and stored on first use.
    ///
    /// # Errors
    ///
    /// [`PpiError::UnknownGene`] if the gene is not cached; classifier
    /// failures are surfaced as-is.
    #[instrument(skip(self, cache))]
    pub fn extended_detail(&self, cache: &mut KnowledgeCache, symbol: &str) -> Result<String> {
        let symbol = normalize_symbol(symbol);
        if let Some(stored) = cache.extended_data(&symbol)? {
            return Ok(stored);
        }

        let detail = self
            .classifier
            .extended_detail(&symbol)
            .with_context(|| format!("fetch extended detail for {symbol}"))?;
        let payload = serde_json::to_string(&detail).context("serialize extended detail")?;
        cache.set_extended_data(&symbol, &payload)?;
        info!(symbol, "stored extended detail");
        Ok(payload)
    }

    /// Classify every symbol, preserving input order.
    fn classify_all(&self, symbols: &[String]) -> Vec<Classification> {
        let workers = self.max_concurrency.min(symbols.len()).max(1);
        let cursor = &AtomicUsize::new(0);
        let classifier = self.classifier;
        let mut slots: Vec<Option<Classification>> = vec![None; symbols.len()];

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = cursor.fetch_add(1, Ordering::Relaxed);
                            let Some(symbol) = symbols.get(index) else {
                                break;
                            };
                            done.push((index, classify_or_default(classifier, symbol)));
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => {
                        for (index, classification) in done {
                            slots[index] = Some(classification);
                        }
                    }
                    Err(_) => warn!("classification worker panicked"),
                }
            }
        });

        slots
            .into_iter()
            .zip(symbols)
            .map(|(slot, symbol)| slot.unwrap_or_else(|| Classification::fallback(symbol)))
            .collect()
    }
}

/// Category names used by `pending` that the cache does not know, deduped
/// case-insensitively in first-seen order.
fn unknown_categories(cache: &KnowledgeCache, pending: &[PendingGene]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = pending
        .iter()
        .map(|g| g.category.as_str())
        .filter(|name| seen.insert(name.to_ascii_lowercase()))
        .collect();

    let known = cache
        .lookup_categories(&distinct)
        .context("look up discovered categories")?;
    Ok(distinct
        .into_iter()
        .filter(|name| !known.contains_key(*name))
        .map(str::to_string)
        .collect())
}
