//! Gene classifier collaborator.
//!
//! # Contract
//!
//! Given one gene symbol, a classifier answers with a short description and
//! a functional category. The batch enrichment path never fails because of
//! a classifier: [`classify_or_default`] normalizes a successful answer
//! (title-cased category, description clamped to 150 characters) and turns
//! any failure, including a panic inside the classifier, into
//! [`Classification::fallback`].
//!
//! The extended-detail variant ([`Classifier::extended_detail`]) is used for
//! on-demand deep dives and surfaces its failures to the caller.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PpiError;
use crate::model::UNKNOWN_CATEGORY;
use crate::symbol::{title_case, truncate_description};

/// A classifier answer after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub description: String,
    pub category: String,
}

impl Classification {
    /// Normalize a raw answer. Returns `None` if the category is blank.
    #[must_use]
    pub fn normalized(description: &str, category: &str) -> Option<Self> {
        let category = title_case(category);
        if category.is_empty() {
            return None;
        }
        Some(Self {
            description: truncate_description(description),
            category,
        })
    }

    /// The default answer used when classification fails.
    #[must_use]
    pub fn fallback(symbol: &str) -> Self {
        Self {
            description: format!("{symbol} (auto-enrichment pending)"),
            category: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

/// An external source of gene descriptions and categories.
///
/// Implementations are shared across the enrichment worker threads.
pub trait Classifier: Send + Sync {
    /// Classify one uppercase gene symbol.
    ///
    /// # Errors
    ///
    /// Any failure: transport, malformed response, missing fields.
    fn classify(&self, symbol: &str) -> Result<Classification>;

    /// Fetch the extended clinical detail for one gene as opaque JSON.
    ///
    /// # Errors
    ///
    /// Any failure. Unlike [`Classifier::classify`] this is never defaulted.
    fn extended_detail(&self, symbol: &str) -> Result<serde_json::Value>;
}

/// Classify one symbol, absorbing every failure into the default answer.
#[must_use]
pub fn classify_or_default<C: Classifier + ?Sized>(classifier: &C, symbol: &str) -> Classification {
    let answer = catch_unwind(AssertUnwindSafe(|| classifier.classify(symbol)));
    match answer {
        Ok(Ok(raw)) => match Classification::normalized(&raw.description, &raw.category) {
            Some(c) => {
                debug!(symbol, category = %c.category, "classified gene");
                c
            }
            None => {
                warn!(symbol, "classifier returned a blank category, using default");
                Classification::fallback(symbol)
            }
        },
        Ok(Err(err)) => {
            warn!(symbol, "classification failed, using default: {err:#}");
            Classification::fallback(symbol)
        }
        Err(_) => {
            warn!(symbol, "classifier panicked, using default");
            Classification::fallback(symbol)
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawClassification {
    description: Option<String>,
    category: Option<String>,
}

/// Parse a classifier response body.
///
/// Accepts a bare JSON object or one wrapped in Markdown code fences
/// (```` ```json ... ``` ````). Both `description` and `category` must be
/// present.
///
/// # Errors
///
/// Returns an error if the body is not JSON or a field is missing.
pub fn parse_classification(body: &str) -> Result<Classification> {
    let cleaned = strip_code_fences(body);
    let raw: RawClassification =
        serde_json::from_str(cleaned).context("classifier response is not valid JSON")?;

    let (Some(description), Some(category)) = (raw.description, raw.category) else {
        anyhow::bail!("classifier response is missing description or category");
    };

    Ok(Classification {
        description,
        category,
    })
}

fn strip_code_fences(body: &str) -> &str {
    let mut text = body.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Blocking HTTP client for a JSON classification endpoint.
///
/// Sends `POST {endpoint}` with `{"symbol": "TP53"}` and a bearer token.
pub struct HttpClassifier {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl HttpClassifier {
    /// Build a client with the given per-request timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn post(&self, body: &serde_json::Value) -> Result<String> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("User-Agent", "ppinet")
            .send_json(body)
            .map_err(|err| anyhow::anyhow!("classifier request to {} failed: {err}", self.endpoint))?;

        response
            .into_string()
            .context("failed to read classifier response body")
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, symbol: &str) -> Result<Classification> {
        let body = self
            .post(&serde_json::json!({ "symbol": symbol }))
            .map_err(|err| PpiError::ClassifierFailed {
                symbol: symbol.to_string(),
                reason: format!("{err:#}"),
            })?;
        parse_classification(&body).with_context(|| format!("classify {symbol}"))
    }

    fn extended_detail(&self, symbol: &str) -> Result<serde_json::Value> {
        let body = self
            .post(&serde_json::json!({ "symbol": symbol, "detail": "extended" }))
            .map_err(|err| PpiError::ClassifierFailed {
                symbol: symbol.to_string(),
                reason: format!("{err:#}"),
            })?;
        serde_json::from_str(strip_code_fences(&body))
            .with_context(|| format!("extended detail for {symbol} is not valid JSON"))
    }
}

/// Classifier used when no endpoint or API key is configured.
///
/// Every call fails, so batch enrichment degrades to default answers and
/// extended detail reports the missing configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClassifier;

impl Classifier for OfflineClassifier {
    fn classify(&self, symbol: &str) -> Result<Classification> {
        Err(PpiError::ClassifierFailed {
            symbol: symbol.to_string(),
            reason: "no classifier configured".to_string(),
        }
        .into())
    }

    fn extended_detail(&self, symbol: &str) -> Result<serde_json::Value> {
        self.classify(symbol).map(|_| serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(String, String);

    fn fixed(description: &str, category: &str) -> Fixed {
        Fixed(description.to_string(), category.to_string())
    }

    impl Classifier for Fixed {
        fn classify(&self, _symbol: &str) -> Result<Classification> {
            Ok(Classification {
                description: self.0.clone(),
                category: self.1.clone(),
            })
        }

        fn extended_detail(&self, _symbol: &str) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    struct Panics;

    impl Classifier for Panics {
        fn classify(&self, _symbol: &str) -> Result<Classification> {
            panic!("boom")
        }

        fn extended_detail(&self, _symbol: &str) -> Result<serde_json::Value> {
            panic!("boom")
        }
    }

    #[test]
    fn parses_bare_json() {
        let c = parse_classification(r#"{"description": "DNA repair", "category": "Kinase"}"#)
            .expect("parse");
        assert_eq!(c.description, "DNA repair");
        assert_eq!(c.category, "Kinase");
    }

    #[test]
    fn parses_fenced_json() {
        let body = "```json\n{\"description\": \"Sodium channel\", \"category\": \"ion channel\"}\n```";
        let c = parse_classification(body).expect("parse fenced");
        assert_eq!(c.category, "ion channel");
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(parse_classification(r#"{"description": "x"}"#).is_err());
        assert!(parse_classification("not json").is_err());
    }

    #[test]
    fn answers_are_normalized() {
        let long = "y".repeat(400);
        let classifier = fixed(&long, "  ion CHANNEL ");
        let c = classify_or_default(&classifier, "SCN1A");
        assert_eq!(c.category, "Ion Channel");
        assert_eq!(c.description.chars().count(), 150);
    }

    #[test]
    fn blank_category_falls_back() {
        let c = classify_or_default(&fixed("desc", "   "), "ABC1");
        assert_eq!(c, Classification::fallback("ABC1"));
    }

    #[test]
    fn failure_falls_back() {
        let c = classify_or_default(&OfflineClassifier, "TP53");
        assert_eq!(c.category, "Unknown");
        assert_eq!(c.description, "TP53 (auto-enrichment pending)");
    }

    #[test]
    fn panic_falls_back() {
        let c = classify_or_default(&Panics, "EGFR");
        assert_eq!(c, Classification::fallback("EGFR"));
    }

    #[test]
    fn offline_extended_detail_surfaces_failure() {
        let err = OfflineClassifier
            .extended_detail("TP53")
            .expect_err("offline must fail");
        assert!(PpiError::find(&err).is_some());
    }
}
