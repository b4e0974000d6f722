//! End-to-end enrichment workflow against an in-memory cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use ppinet_core::classify::{Classification, Classifier};
use ppinet_core::enrich::{EnrichmentOutcome, EnrichmentState, Orchestrator};
use ppinet_core::model::GeneInput;
use ppinet_core::{KnowledgeCache, PpiError};

/// Answers from a fixed table and counts every call.
#[derive(Default)]
struct CountingClassifier {
    answers: HashMap<String, (String, String)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
    seen: Mutex<Vec<String>>,
}

impl CountingClassifier {
    fn with(answers: &[(&str, &str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(s, d, c)| ((*s).to_string(), ((*d).to_string(), (*c).to_string())))
                .collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for CountingClassifier {
    fn classify(&self, symbol: &str) -> Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.seen.lock().expect("seen lock").push(symbol.to_string());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.answers.get(symbol) {
            Some((description, category)) => Ok(Classification {
                description: description.clone(),
                category: category.clone(),
            }),
            None if symbol == "PANIC" => panic!("classifier blew up"),
            None => bail!("no answer for {symbol}"),
        }
    }

    fn extended_detail(&self, symbol: &str) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({ "symbol": symbol, "drugs": ["example"] }))
    }
}

fn seed(cache: &mut KnowledgeCache, symbol: &str, category: &str) {
    let id = cache.lookup_categories(&[category]).expect("lookup")[category].id;
    cache
        .bulk_upsert_genes(&[GeneInput {
            symbol: symbol.to_string(),
            category_id: id,
            description: format!("{symbol} seeded"),
        }])
        .expect("seed gene");
}

#[test]
fn fully_cached_list_resolves_without_classifier_calls() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    seed(&mut cache, "A", "Kinase");
    seed(&mut cache, "B", "Oncogene");

    let classifier = CountingClassifier::default();
    let outcome = Orchestrator::new(&classifier, 4)
        .enrich(&mut cache, &["A", "b"])
        .expect("enrich");

    assert_eq!(outcome, EnrichmentOutcome::Resolved);
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn new_category_requires_review_and_writes_nothing() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let classifier = CountingClassifier::with(&[("SCN1A", "Sodium channel", "ion channel")]);

    let outcome = Orchestrator::new(&classifier, 4)
        .enrich(&mut cache, &["scn1a"])
        .expect("enrich");

    assert_eq!(outcome.state(), EnrichmentState::CategoryReviewRequired);
    let EnrichmentOutcome::CategoryReviewRequired(review) = outcome else {
        unreachable!();
    };
    assert_eq!(review.new_categories, vec!["Ion Channel".to_string()]);
    assert_eq!(review.genes.len(), 1);
    assert_eq!(review.genes[0].category, "Ion Channel");
    assert_eq!(cache.gene_count().expect("count"), 0);
    assert!(cache.lookup_categories(&["Ion Channel"]).expect("lookup").is_empty());
}

#[test]
fn approval_commits_then_repeat_resolves_from_cache() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let classifier = CountingClassifier::with(&[
        ("SCN1A", "Sodium channel", "Ion Channel"),
        ("EGFR", "Receptor tyrosine kinase", "Oncogene"),
    ]);
    let orchestrator = Orchestrator::new(&classifier, 4);

    let EnrichmentOutcome::CategoryReviewRequired(review) = orchestrator
        .enrich(&mut cache, &["SCN1A", "EGFR"])
        .expect("enrich")
    else {
        panic!("expected review");
    };
    assert_eq!(classifier.calls(), 2);

    let report = orchestrator
        .commit(&mut cache, &review.new_categories, &review.genes)
        .expect("commit");
    assert_eq!(report.categories_created, 1);
    assert_eq!(report.genes_written, 2);

    let category = &cache.lookup_categories(&["Ion Channel"]).expect("lookup")["Ion Channel"];
    assert_eq!(category.color, "#808080");

    let again = orchestrator
        .enrich(&mut cache, &["scn1a", "egfr"])
        .expect("enrich again");
    assert_eq!(again, EnrichmentOutcome::Resolved);
    assert_eq!(classifier.calls(), 2, "second pass is served from cache");
}

#[test]
fn known_categories_commit_directly() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    seed(&mut cache, "TP53", "Tumor Suppressor");
    let classifier = CountingClassifier::with(&[("BRAF", "RAF kinase", "kinase")]);

    let outcome = Orchestrator::new(&classifier, 4)
        .enrich(&mut cache, &["TP53", "BRAF"])
        .expect("enrich");

    let EnrichmentOutcome::Committed(report) = outcome else {
        panic!("expected commit, got {outcome:?}");
    };
    assert_eq!(report.genes_written, 1);
    assert_eq!(classifier.calls(), 1, "only the miss is classified");
    assert_eq!(
        cache.lookup_genes(&["BRAF"]).expect("lookup")["BRAF"].category,
        "Kinase"
    );
}

#[test]
fn partial_failures_degrade_to_unknown() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let classifier = CountingClassifier::with(&[("MYC", "Proto-oncogene", "Oncogene")]);

    let outcome = Orchestrator::new(&classifier, 3)
        .enrich(&mut cache, &["MYC", "NOANSWER", "PANIC"])
        .expect("enrich survives failures");

    let EnrichmentOutcome::CategoryReviewRequired(review) = outcome else {
        panic!("Unknown is not seeded, so it needs review");
    };
    assert_eq!(review.new_categories, vec!["Unknown".to_string()]);
    let by_symbol: HashMap<_, _> = review
        .genes
        .iter()
        .map(|g| (g.symbol.as_str(), g))
        .collect();
    assert_eq!(by_symbol["MYC"].category, "Oncogene");
    assert_eq!(by_symbol["NOANSWER"].category, "Unknown");
    assert_eq!(by_symbol["PANIC"].description, "PANIC (auto-enrichment pending)");
    assert_eq!(classifier.calls(), 3);
}

#[test]
fn unapproved_categories_are_skipped_on_commit() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let classifier = CountingClassifier::with(&[
        ("SCN1A", "Sodium channel", "Ion Channel"),
        ("IL6", "Cytokine", "Cytokine"),
    ]);
    let orchestrator = Orchestrator::new(&classifier, 2);
    let EnrichmentOutcome::CategoryReviewRequired(review) =
        orchestrator.enrich(&mut cache, &["SCN1A", "IL6"]).expect("enrich")
    else {
        panic!("expected review");
    };
    assert_eq!(review.new_categories, ["Ion Channel", "Cytokine"]);

    let report = orchestrator
        .commit(&mut cache, &["Ion Channel"], &review.genes)
        .expect("commit");
    assert_eq!(report.genes_written, 1);
    assert_eq!(report.skipped, vec!["IL6".to_string()]);
}

#[test]
fn fan_out_respects_concurrency_cap() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let symbols: Vec<String> = (0..12).map(|i| format!("G{i}")).collect();
    let answers: Vec<(String, String, String)> = symbols
        .iter()
        .map(|s| (s.clone(), "desc".to_string(), "Other".to_string()))
        .collect();
    let borrowed: Vec<(&str, &str, &str)> = answers
        .iter()
        .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
        .collect();
    let mut classifier = CountingClassifier::with(&borrowed);
    classifier.delay = Duration::from_millis(20);

    let outcome = Orchestrator::new(&classifier, 3)
        .enrich(&mut cache, &symbols)
        .expect("enrich");

    assert_eq!(outcome.state(), EnrichmentState::Committed);
    assert_eq!(classifier.calls(), 12);
    assert!(classifier.peak.load(Ordering::SeqCst) <= 3);

    let mut seen = classifier.seen.lock().expect("seen lock").clone();
    seen.sort();
    let mut expected = symbols.clone();
    expected.sort();
    assert_eq!(seen, expected, "every miss classified exactly once");
}

#[test]
fn extended_detail_is_fetched_once_then_cached() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    seed(&mut cache, "BRAF", "Kinase");
    let classifier = CountingClassifier::default();
    let orchestrator = Orchestrator::new(&classifier, 1);

    let first = orchestrator
        .extended_detail(&mut cache, "braf")
        .expect("fetch");
    let second = orchestrator
        .extended_detail(&mut cache, "BRAF")
        .expect("cached");
    assert_eq!(first, second);
    assert_eq!(classifier.calls(), 1);
    let value: serde_json::Value = serde_json::from_str(&first).expect("json");
    assert_eq!(value["symbol"], "BRAF");
}

#[test]
fn extended_detail_requires_cached_gene() {
    let mut cache = KnowledgeCache::in_memory().expect("cache");
    let classifier = CountingClassifier::default();
    let err = Orchestrator::new(&classifier, 1)
        .extended_detail(&mut cache, "NOPE")
        .expect_err("uncached");
    assert!(matches!(PpiError::find(&err), Some(PpiError::UnknownGene(_))));
    assert_eq!(classifier.calls(), 0);
}
