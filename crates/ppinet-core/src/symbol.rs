//! Text normalization shared by the cache, the classifier, and the graph.
//!
//! Gene symbols are compared case-insensitively everywhere by normalizing
//! them to trimmed uppercase at every boundary. Category names are title
//! cased so that `"ion channel"` and `"Ion Channel"` dedupe to one row.

/// Maximum description length accepted into the cache, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 150;

/// Normalize a gene symbol or graph node label: trim and uppercase.
#[must_use]
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize a gene list: drop blanks, uppercase, and dedupe while keeping
/// first-seen order.
#[must_use]
pub fn normalize_gene_list<S: AsRef<str>>(genes: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    genes
        .iter()
        .map(|g| normalize_symbol(g.as_ref()))
        .filter(|g| !g.is_empty())
        .filter(|g| seen.insert(g.clone()))
        .collect()
}

/// Title-case a category name.
///
/// The first letter of every alphabetic run is uppercased and the rest
/// lowercased, so `"g-PROTEIN coupled"` becomes `"G-Protein Coupled"`.
#[must_use]
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Clamp a description to [`MAX_DESCRIPTION_CHARS`], ending in `...` when cut.
#[must_use]
pub fn truncate_description(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    out.push_str("...");
    out
}
