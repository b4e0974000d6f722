//! Interaction-evidence collaborator.
//!
//! An [`InteractionSource`] turns a gene set and a minimum confidence into
//! pairwise [`InteractionRecord`]s. The production implementation is
//! [`StringDbClient`], which talks to the STRING network endpoint.
//!
//! ## Failure policy
//!
//! - Transport failures and error statuses are surfaced as
//!   [`PpiError::EvidenceUnavailable`] so the caller can retry.
//! - An empty or undecodable body means "zero interactions found".
//! - [`StringDbClient::protein_details`] reports an unknown symbol as
//!   [`PpiError::ProteinNotFound`]. A failed annotation fetch only degrades
//!   the description.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::PpiError;

/// One pairwise interaction as reported by the evidence source.
///
/// `score` is either on the 0–1000 integer scale or already normalized to
/// 0–1; the graph builder accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub node_a: String,
    pub node_b: String,
    pub score: f64,
}

impl InteractionRecord {
    #[must_use]
    pub fn new(node_a: impl Into<String>, node_b: impl Into<String>, score: f64) -> Self {
        Self {
            node_a: node_a.into(),
            node_b: node_b.into(),
            score,
        }
    }
}

/// A source of interaction evidence.
pub trait InteractionSource {
    /// Fetch interactions among `genes` at or above `min_confidence` (0–1).
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::EvidenceUnavailable`] when the source cannot be
    /// reached.
    fn fetch_interactions(&self, genes: &[String], min_confidence: f64)
    -> Result<Vec<InteractionRecord>>;
}

/// Convert a 0–1 confidence into the 0–1000 integer scale, truncating.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn required_score(min_confidence: f64) -> u32 {
    if !min_confidence.is_finite() {
        return 0;
    }
    // Round away representation noise first so 0.7 maps to 700, not 699.
    let scaled = (min_confidence.clamp(0.0, 1.0) * 1000.0 * 1e6).round() / 1e6;
    scaled.floor() as u32
}

/// Wire shape of one STRING network row.
#[derive(Debug, Deserialize)]
struct StringInteraction {
    #[serde(rename = "preferredName_A")]
    preferred_name_a: Option<String>,
    #[serde(rename = "preferredName_B")]
    preferred_name_b: Option<String>,
    #[serde(rename = "stringId_A")]
    string_id_a: Option<String>,
    #[serde(rename = "stringId_B")]
    string_id_b: Option<String>,
    score: Option<f64>,
}

impl StringInteraction {
    fn into_record(self) -> Option<InteractionRecord> {
        let a = self.preferred_name_a.or(self.string_id_a)?;
        let b = self.preferred_name_b.or(self.string_id_b)?;
        Some(InteractionRecord::new(a, b, self.score.unwrap_or(0.0)))
    }
}

/// Decode a STRING network response body into records.
///
/// Rows without either endpoint label are dropped. A body that is not a
/// JSON array of rows yields no records.
#[must_use]
pub fn parse_string_network(body: &str) -> Vec<InteractionRecord> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<StringInteraction>>(body) {
        Ok(rows) => rows
            .into_iter()
            .filter_map(StringInteraction::into_record)
            .collect(),
        Err(err) => {
            warn!("evidence response could not be decoded, treating as empty: {err}");
            Vec::new()
        }
    }
}

/// Description used when STRING has no annotation for a protein.
pub const NO_DESCRIPTION: &str = "No description available";

/// Identity and reference links for one protein.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinDetails {
    pub gene: String,
    pub protein_id: String,
    pub preferred_name: String,
    pub annotation: String,
    pub ncbi_url: String,
    pub uniprot_url: String,
    pub string_url: String,
}

impl ProteinDetails {
    /// Assemble details for `gene` from its resolved STRING identity.
    #[must_use]
    pub fn new(gene: &str, protein_id: String, preferred_name: String, annotation: String) -> Self {
        Self {
            gene: gene.to_string(),
            ncbi_url: format!("https://www.ncbi.nlm.nih.gov/gene/?term={gene}"),
            uniprot_url: format!("https://www.uniprot.org/uniprot/?query={gene}+AND+organism:9606"),
            string_url: format!("https://string-db.org/network/{protein_id}"),
            protein_id,
            preferred_name,
            annotation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StringIdentity {
    #[serde(rename = "stringId")]
    string_id: Option<String>,
    #[serde(rename = "preferredName")]
    preferred_name: Option<String>,
    annotation: Option<String>,
}

/// First resolved `(string_id, preferred_name)` in a `json/get_string_ids`
/// body. The preferred name falls back to the string id.
#[must_use]
pub fn parse_string_ids(body: &str) -> Option<(String, String)> {
    let rows: Vec<StringIdentity> = serde_json::from_str(body).ok()?;
    rows.into_iter().find_map(|row| {
        let id = row.string_id.filter(|id| !id.is_empty())?;
        let name = row.preferred_name.unwrap_or_else(|| id.clone());
        Some((id, name))
    })
}

/// First non-blank annotation in a `json/get_annotation` body.
#[must_use]
pub fn parse_annotation(body: &str) -> Option<String> {
    let rows: Vec<StringIdentity> = serde_json::from_str(body).ok()?;
    rows.into_iter()
        .filter_map(|row| row.annotation)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Blocking client for the STRING `json/network` endpoint.
pub struct StringDbClient {
    agent: ureq::Agent,
    base_url: String,
    species: u32,
    caller_identity: String,
}

impl StringDbClient {
    /// Build a client against `base_url` (for example `https://string-db.org/api`).
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        species: u32,
        caller_identity: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into(),
            species,
            caller_identity: caller_identity.into(),
        }
    }
}

impl StringDbClient {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/json/{path}", self.base_url.trim_end_matches('/'))
    }

    fn get_body(&self, url: &str, identifier: &str) -> Result<String> {
        let response = self
            .agent
            .get(url)
            .query("identifiers", identifier)
            .query("species", &self.species.to_string())
            .query("caller_identity", &self.caller_identity)
            .call()
            .map_err(|err| PpiError::EvidenceUnavailable(format!("{url}: {err}")))?;
        Ok(response
            .into_string()
            .map_err(|err| PpiError::EvidenceUnavailable(format!("read body from {url}: {err}")))?)
    }

    /// Resolve `symbol` to its STRING protein and describe it.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::EvidenceUnavailable`] when STRING cannot be
    /// reached, or [`PpiError::ProteinNotFound`] when it does not know the
    /// symbol.
    #[instrument(skip(self))]
    pub fn protein_details(&self, symbol: &str) -> Result<ProteinDetails> {
        let body = self.get_body(&self.endpoint("get_string_ids"), symbol)?;
        let (protein_id, preferred_name) = parse_string_ids(&body)
            .ok_or_else(|| PpiError::ProteinNotFound(symbol.to_string()))?;

        let annotation = match self.get_body(&self.endpoint("get_annotation"), &protein_id) {
            Ok(body) => parse_annotation(&body),
            Err(err) => {
                warn!(protein = %protein_id, "annotation unavailable: {err:#}");
                None
            }
        }
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Ok(ProteinDetails::new(symbol, protein_id, preferred_name, annotation))
    }
}

impl InteractionSource for StringDbClient {
    #[instrument(skip(self, genes), fields(genes = genes.len()))]
    fn fetch_interactions(
        &self,
        genes: &[String],
        min_confidence: f64,
    ) -> Result<Vec<InteractionRecord>> {
        if genes.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/json/network", self.base_url.trim_end_matches('/'));
        let response = self
            .agent
            .get(&url)
            .query("identifiers", &genes.join("\r"))
            .query("species", &self.species.to_string())
            .query("caller_identity", &self.caller_identity)
            .query("required_score", &required_score(min_confidence).to_string())
            .call()
            .map_err(|err| PpiError::EvidenceUnavailable(format!("{url}: {err}")))?;

        let body = response
            .into_string()
            .map_err(|err| PpiError::EvidenceUnavailable(format!("read body from {url}: {err}")))?;

        let records = parse_string_network(&body);
        if records.is_empty() {
            warn!("no interactions found for {} genes", genes.len());
        } else {
            info!(interactions = records.len(), "retrieved interaction evidence");
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_maps_to_thousand_scale() {
        assert_eq!(required_score(0.4), 400);
        assert_eq!(required_score(0.7), 700);
        assert_eq!(required_score(0.0), 0);
        assert_eq!(required_score(1.0), 1000);
        assert_eq!(required_score(0.1234), 123);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        assert_eq!(required_score(-1.0), 0);
        assert_eq!(required_score(7.5), 1000);
        assert_eq!(required_score(f64::NAN), 0);
    }

    #[test]
    fn parses_string_rows() {
        let body = r#"[
            {"stringId_A": "9606.ENSP1", "stringId_B": "9606.ENSP2",
             "preferredName_A": "TP53", "preferredName_B": "MDM2", "score": 0.999},
            {"stringId_A": "9606.ENSP3", "stringId_B": "9606.ENSP4", "score": 0.5}
        ]"#;
        let records = parse_string_network(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], InteractionRecord::new("TP53", "MDM2", 0.999));
        assert_eq!(records[1].node_a, "9606.ENSP3");
    }

    #[test]
    fn rows_without_labels_are_dropped() {
        let records = parse_string_network(r#"[{"score": 0.9}]"#);
        assert!(records.is_empty());
    }

    #[test]
    fn empty_or_garbage_bodies_yield_nothing() {
        assert!(parse_string_network("").is_empty());
        assert!(parse_string_network("[]").is_empty());
        assert!(parse_string_network("<html>busy</html>").is_empty());
    }

    #[test]
    fn string_ids_take_the_first_resolved_row() {
        let body = r#"[
            {"queryIndex": 0, "stringId": "9606.ENSP00000269305",
             "preferredName": "TP53", "annotation": "Cellular tumor antigen p53"},
            {"queryIndex": 0, "stringId": "9606.ENSP00000000001", "preferredName": "TP53B"}
        ]"#;
        assert_eq!(
            parse_string_ids(body),
            Some(("9606.ENSP00000269305".to_string(), "TP53".to_string()))
        );
        assert_eq!(
            parse_string_ids(r#"[{"stringId": "9606.ENSP9"}]"#),
            Some(("9606.ENSP9".to_string(), "9606.ENSP9".to_string()))
        );
    }

    #[test]
    fn unknown_symbols_resolve_to_nothing() {
        assert!(parse_string_ids("[]").is_none());
        assert!(parse_string_ids(r#"[{"stringId": ""}]"#).is_none());
        assert!(parse_string_ids("Error: not found").is_none());
    }

    #[test]
    fn annotation_skips_blank_rows() {
        let body = r#"[{"annotation": "  "}, {"annotation": "E3 ubiquitin-protein ligase Mdm2; "}]"#;
        assert_eq!(
            parse_annotation(body).as_deref(),
            Some("E3 ubiquitin-protein ligase Mdm2;")
        );
        assert!(parse_annotation("[]").is_none());
    }

    #[test]
    fn protein_links_use_symbol_and_string_id() {
        let details = ProteinDetails::new(
            "TP53",
            "9606.ENSP00000269305".to_string(),
            "TP53".to_string(),
            NO_DESCRIPTION.to_string(),
        );
        assert_eq!(details.ncbi_url, "https://www.ncbi.nlm.nih.gov/gene/?term=TP53");
        assert_eq!(
            details.uniprot_url,
            "https://www.uniprot.org/uniprot/?query=TP53+AND+organism:9606"
        );
        assert_eq!(details.string_url, "https://string-db.org/network/9606.ENSP00000269305");
    }

    #[test]
    fn protein_lookup_against_unreachable_source_is_retryable() {
        let client = StringDbClient::new(
            "http://127.0.0.1:9",
            9606,
            "ppinet-test",
            Duration::from_millis(200),
        );
        let err = client.protein_details("TP53").expect_err("nothing listens");
        assert!(matches!(
            PpiError::find(&err),
            Some(PpiError::EvidenceUnavailable(_))
        ));
    }

    #[test]
    fn unreachable_source_is_retryable() {
        let client = StringDbClient::new(
            "http://127.0.0.1:9",
            9606,
            "ppinet-test",
            Duration::from_millis(200),
        );
        let err = client
            .fetch_interactions(&["TP53".to_string()], 0.4)
            .expect_err("nothing listens on the discard port");
        let domain = PpiError::find(&err).expect("domain error");
        assert!(domain.code().is_retryable());
    }
}
