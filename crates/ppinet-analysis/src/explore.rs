//! Session driver: enrichment, evidence fetch, analysis.
//!
//! An [`Explorer`] owns nothing; it borrows the cache and both
//! collaborators for the duration of a request.
//!
//! ```text
//! explore(genes, confidence)
//!    ├─ enrich ── CategoryReviewRequired ──▶ Exploration::ReviewRequired(ticket)
//!    └─ Resolved | Committed ─▶ fetch_interactions ─▶ analyze ─▶ Exploration::Analyzed
//!
//! approve(ticket)
//!    └─ commit ─▶ fetch_interactions ─▶ analyze ─▶ AnalysisResult
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ppinet_core::classify::Classifier;
use ppinet_core::config::PpiConfig;
use ppinet_core::enrich::{EnrichmentOutcome, Orchestrator, PendingReview};
use ppinet_core::evidence::InteractionSource;
use ppinet_core::model::PendingGene;
use ppinet_core::symbol::normalize_gene_list;
use ppinet_core::{KnowledgeCache, PpiError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::pipeline::{AnalysisResult, analyze};

/// A pending category review handed to a human and accepted back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTicket {
    pub created_at: DateTime<Utc>,
    /// Normalized gene list of the original request.
    pub original_genes: Vec<String>,
    pub confidence: f64,
    /// Categories to create on approval. Remove entries to reject them.
    pub new_categories: Vec<String>,
    pub pending_genes: Vec<PendingGene>,
}

impl ReviewTicket {
    #[must_use]
    pub fn new(review: PendingReview, original_genes: Vec<String>, confidence: f64) -> Self {
        Self {
            created_at: Utc::now(),
            original_genes,
            confidence,
            new_categories: review.new_categories,
            pending_genes: review.genes,
        }
    }

    /// Parse a ticket from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::InvalidInput`] if the text is not a ticket.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| PpiError::InvalidInput(format!("malformed review ticket: {err}")).into())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize review ticket")
    }
}

/// Result of [`Explorer::explore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Exploration {
    /// New categories must be approved before the network is analyzed.
    ReviewRequired(ReviewTicket),
    Analyzed(AnalysisResult),
}

/// Borrowed collaborators for one exploration session.
pub struct Explorer<'a, C, E>
where
    C: Classifier + ?Sized,
    E: InteractionSource + ?Sized,
{
    cache: &'a mut KnowledgeCache,
    evidence: &'a E,
    orchestrator: Orchestrator<'a, C>,
}

impl<'a, C, E> Explorer<'a, C, E>
where
    C: Classifier + ?Sized,
    E: InteractionSource + ?Sized,
{
    #[must_use]
    pub fn new(
        cache: &'a mut KnowledgeCache,
        classifier: &'a C,
        evidence: &'a E,
        config: &PpiConfig,
    ) -> Self {
        let orchestrator = Orchestrator::new(classifier, config.enrichment.max_concurrency)
            .with_category_color(config.enrichment.default_category_color.clone());
        Self {
            cache,
            evidence,
            orchestrator,
        }
    }

    /// Enrich `genes`, then analyze their interaction network unless a
    /// category review is needed first.
    ///
    /// # Errors
    ///
    /// [`PpiError::InvalidInput`] for an empty list or a confidence outside
    /// `[0, 1]`; [`PpiError::EvidenceUnavailable`] if interactions cannot be
    /// fetched; cache failures as reported by the cache.
    #[instrument(skip(self, genes), fields(requested = genes.len()))]
    pub fn explore<S: AsRef<str>>(&mut self, genes: &[S], confidence: f64) -> Result<Exploration> {
        let symbols = validate(genes, confidence)?;

        match self.orchestrator.enrich(&mut *self.cache, &symbols)? {
            EnrichmentOutcome::CategoryReviewRequired(review) => {
                info!(
                    new_categories = review.new_categories.len(),
                    "analysis deferred until categories are approved"
                );
                Ok(Exploration::ReviewRequired(ReviewTicket::new(
                    review, symbols, confidence,
                )))
            }
            EnrichmentOutcome::Resolved | EnrichmentOutcome::Committed(_) => {
                self.fetch_and_analyze(&symbols, confidence)
                    .map(Exploration::Analyzed)
            }
        }
    }

    /// Commit an approved ticket and analyze its original gene list.
    ///
    /// # Errors
    ///
    /// [`PpiError::InvalidInput`] for a ticket with no genes or a bad
    /// confidence; otherwise as [`Explorer::explore`].
    #[instrument(skip(self, ticket), fields(genes = ticket.original_genes.len()))]
    pub fn approve(&mut self, ticket: &ReviewTicket) -> Result<AnalysisResult> {
        let symbols = validate(&ticket.original_genes, ticket.confidence)?;

        let report = self.orchestrator.commit(
            &mut *self.cache,
            &ticket.new_categories,
            &ticket.pending_genes,
        )?;
        info!(
            categories_created = report.categories_created,
            genes_written = report.genes_written,
            "review approved"
        );

        self.fetch_and_analyze(&symbols, ticket.confidence)
    }

    fn fetch_and_analyze(&self, symbols: &[String], confidence: f64) -> Result<AnalysisResult> {
        let records = self
            .evidence
            .fetch_interactions(symbols, confidence)
            .context("fetch interaction evidence")?;
        analyze(&records, symbols, &*self.cache)
    }
}

fn validate<S: AsRef<str>>(genes: &[S], confidence: f64) -> Result<Vec<String>> {
    let symbols = normalize_gene_list(genes);
    if symbols.is_empty() {
        return Err(PpiError::InvalidInput("gene list is empty".to_string()).into());
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err(PpiError::InvalidInput(format!(
            "confidence must be within [0, 1], got {confidence}"
        ))
        .into());
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_blank_lists_and_bad_confidence() {
        assert!(validate(&["  "], 0.4).is_err());
        assert!(validate(&["TP53"], 1.5).is_err());
        assert!(validate(&["TP53"], f64::NAN).is_err());
        assert_eq!(
            validate(&["tp53", "TP53", "mdm2"], 0.0).expect("valid"),
            ["TP53", "MDM2"]
        );
    }

    #[test]
    fn ticket_round_trips_through_json() {
        let ticket = ReviewTicket::new(
            PendingReview {
                new_categories: vec!["Ion Channel".into()],
                genes: vec![PendingGene {
                    symbol: "SCN1A".into(),
                    category: "Ion Channel".into(),
                    description: "Sodium channel".into(),
                }],
            },
            vec!["SCN1A".into()],
            0.4,
        );
        let text = ticket.to_json_pretty().expect("serialize");
        assert_eq!(ReviewTicket::from_json(&text).expect("parse"), ticket);
    }

    #[test]
    fn malformed_ticket_is_invalid_input() {
        let err = ReviewTicket::from_json("{\"nope\": 1}").expect_err("malformed");
        assert!(matches!(PpiError::find(&err), Some(PpiError::InvalidInput(_))));
    }
}
