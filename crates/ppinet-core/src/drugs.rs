//! Drug-interaction lookups against DGIdb.
//!
//! A drug lookup never fails: an outage or an unreadable body becomes a
//! [`DrugReport`] with `druggable = false` and an explanatory `message`.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Drugs listed in a report. `drug_count` still counts all of them.
pub const MAX_LISTED_DRUGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugInteraction {
    pub drug_name: String,
    pub interaction_types: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugReport {
    pub gene: String,
    pub druggable: bool,
    pub drug_count: usize,
    pub drugs: Vec<DrugInteraction>,
    /// Distinct interaction types across every drug, sorted.
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dgidb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DrugReport {
    fn empty(gene: &str, message: String) -> Self {
        Self {
            gene: gene.to_string(),
            druggable: false,
            drug_count: 0,
            drugs: Vec::new(),
            categories: Vec::new(),
            dgidb_url: None,
            message: Some(message),
        }
    }

    /// Report for a lookup that could not be completed.
    #[must_use]
    pub fn unavailable(gene: &str, reason: &str) -> Self {
        Self::empty(gene, format!("Could not fetch drug data: {reason}"))
    }
}

#[derive(Debug, Default, Deserialize)]
struct InteractionsBody {
    #[serde(rename = "matchedTerms", default)]
    matched_terms: Vec<MatchedTerm>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchedTerm {
    #[serde(default)]
    interactions: Vec<WireInteraction>,
}

#[derive(Debug, Deserialize)]
struct WireInteraction {
    #[serde(rename = "drugName")]
    drug_name: Option<String>,
    #[serde(rename = "interactionTypes", default)]
    interaction_types: Vec<String>,
    #[serde(default)]
    sources: Vec<String>,
}

/// Decode a DGIdb `interactions.json` body into a report for `gene`.
#[must_use]
pub fn parse_dgidb(gene: &str, body: &str) -> DrugReport {
    let parsed: InteractionsBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(gene, "drug response could not be decoded: {err}");
            return DrugReport::unavailable(gene, &err.to_string());
        }
    };

    if parsed.matched_terms.is_empty() {
        return DrugReport::empty(gene, format!("No drug interactions found for {gene}"));
    }

    let mut categories = BTreeSet::new();
    let drugs: Vec<DrugInteraction> = parsed
        .matched_terms
        .into_iter()
        .flat_map(|term| term.interactions)
        .map(|wire| {
            categories.extend(wire.interaction_types.iter().cloned());
            DrugInteraction {
                drug_name: wire.drug_name.unwrap_or_else(|| "Unknown".to_string()),
                interaction_types: wire.interaction_types,
                sources: wire.sources,
            }
        })
        .collect();

    let drug_count = drugs.len();
    DrugReport {
        gene: gene.to_string(),
        druggable: drug_count > 0,
        drug_count,
        drugs: drugs.into_iter().take(MAX_LISTED_DRUGS).collect(),
        categories: categories.into_iter().collect(),
        dgidb_url: Some(format!("https://dgidb.org/genes/{gene}")),
        message: None,
    }
}

/// Blocking client for the DGIdb interactions endpoint.
pub struct DgidbClient {
    agent: ureq::Agent,
    base_url: String,
}

impl DgidbClient {
    /// Build a client against `base_url` (for example `https://dgidb.org/api/v2`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.into(),
        }
    }

    /// Look up drug interactions for `gene`.
    #[instrument(skip(self))]
    pub fn drug_report(&self, gene: &str) -> DrugReport {
        let url = format!("{}/interactions.json", self.base_url.trim_end_matches('/'));
        let body = self
            .agent
            .get(&url)
            .query("genes", gene)
            .call()
            .map_err(|err| err.to_string())
            .and_then(|response| response.into_string().map_err(|err| err.to_string()));

        match body {
            Ok(body) => {
                let report = parse_dgidb(gene, &body);
                info!(drugs = report.drug_count, "retrieved drug interactions");
                report
            }
            Err(reason) => {
                warn!("drug database unavailable: {reason}");
                DrugReport::unavailable(gene, &reason)
            }
        }
    }
}
