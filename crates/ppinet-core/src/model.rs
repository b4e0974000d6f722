//! Row types for the knowledge cache.

use serde::{Deserialize, Serialize};

/// Display color given to categories approved without an explicit color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#808080";

/// Category name used when nothing is known about a gene.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A cached gene with its resolved category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub id: i64,
    /// Uppercase gene symbol.
    pub symbol: String,
    pub category_id: i64,
    /// Name of the referenced category, joined at read time.
    pub category: String,
    pub description: String,
    /// Opaque JSON produced by the extended-detail classifier, if fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_data: Option<String>,
}

/// A functional category and its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// Input row for [`crate::cache::KnowledgeCache::bulk_upsert_genes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneInput {
    pub symbol: String,
    pub category_id: i64,
    pub description: String,
}

/// A category awaiting creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

impl NewCategory {
    /// A category with the default grey display color.
    #[must_use]
    pub fn grey(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }
}

/// A freshly classified gene that has not been written yet.
///
/// The category is referenced by name because it may not exist in the
/// cache until the review step approves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGene {
    pub symbol: String,
    pub category: String,
    pub description: String,
}
