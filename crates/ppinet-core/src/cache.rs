//! Persistent gene knowledge cache.
//!
//! # Overview
//!
//! [`KnowledgeCache`] wraps one `SQLite` connection holding the `categories`
//! and `genes` tables (see [`crate::db::schema`]). Reads are plain queries;
//! every write method runs inside exactly one transaction.
//!
//! ## Write semantics
//!
//! A write either commits every row of its batch or none of them. On
//! failure the transaction is rolled back and the method returns
//! [`PpiError::CacheWrite`]; callers must read that as "nothing changed"
//! and may retry the identical call.
//!
//! [`KnowledgeCache::commit_enrichment`] creates categories and upserts the
//! genes that reference them in the same transaction, so no reader can
//! observe a gene pointing at a category that is not committed yet.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::db;
use crate::error::PpiError;
use crate::model::{Category, Gene, GeneInput, NewCategory, PendingGene};
use crate::symbol::normalize_symbol;

/// Maximum number of bound parameters per `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

/// Result of [`KnowledgeCache::commit_enrichment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Categories inserted by this call (already-present names excluded).
    pub categories_created: usize,
    /// Genes inserted by this call.
    pub genes_written: usize,
    /// Symbols already cached before this call. Their stored category and
    /// description are left untouched.
    #[serde(default)]
    pub already_cached: Vec<String>,
    /// Symbols skipped because their category neither existed nor was
    /// approved.
    pub skipped: Vec<String>,
}

/// Gene and category store backed by `SQLite`.
pub struct KnowledgeCache {
    conn: Connection,
}

impl KnowledgeCache {
    /// Open (creating and migrating if needed) the cache at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::open_cache_db(path)?,
        })
    }

    /// A private in-memory cache with the seeded schema.
    ///
    /// # Errors
    ///
    /// Returns an error if migration fails.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    /// Borrow the underlying connection for ad-hoc queries.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Look up genes by symbol, case-insensitively.
    ///
    /// The result is keyed by uppercase symbol. Symbols that are not cached
    /// are simply absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn lookup_genes<S: AsRef<str>>(&self, symbols: &[S]) -> Result<HashMap<String, Gene>> {
        let mut normalized: Vec<String> = symbols
            .iter()
            .map(|s| normalize_symbol(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        normalized.sort_unstable();
        normalized.dedup();

        let mut found = HashMap::with_capacity(normalized.len());
        for chunk in normalized.chunks(LOOKUP_CHUNK) {
            let sql = format!(
                "SELECT g.id, g.symbol, g.category_id, c.name, g.description, g.extended_data
                 FROM genes g
                 JOIN categories c ON c.id = g.category_id
                 WHERE g.symbol IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql).context("prepare gene lookup")?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    Ok(Gene {
                        id: row.get(0)?,
                        symbol: row.get(1)?,
                        category_id: row.get(2)?,
                        category: row.get(3)?,
                        description: row.get(4)?,
                        extended_data: row.get(5)?,
                    })
                })
                .context("execute gene lookup")?;
            for gene in rows {
                let gene = gene.context("read gene row")?;
                found.insert(gene.symbol.clone(), gene);
            }
        }
        Ok(found)
    }

    /// Look up categories by name, case-insensitively.
    ///
    /// The result is keyed by the requested name (trimmed), so callers can
    /// index it with the same strings they passed in. Unknown names are
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn lookup_categories<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<HashMap<String, Category>> {
        let requested: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();

        let mut by_folded: HashMap<String, Category> = HashMap::new();
        for chunk in requested.chunks(LOOKUP_CHUNK) {
            let sql = format!(
                "SELECT id, name, color FROM categories WHERE name IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql).context("prepare category lookup")?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), category_from_row)
                .context("execute category lookup")?;
            for category in rows {
                let category = category.context("read category row")?;
                by_folded.insert(category.name.to_ascii_lowercase(), category);
            }
        }

        Ok(requested
            .into_iter()
            .filter_map(|name| {
                by_folded
                    .get(&name.to_ascii_lowercase())
                    .map(|c| (name.to_string(), c.clone()))
            })
            .collect())
    }

    /// All categories in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY id")
            .context("prepare category listing")?;
        let categories = stmt
            .query_map([], category_from_row)
            .context("execute category listing")?
            .collect::<Result<Vec<_>, _>>()
            .context("collect categories")?;
        Ok(categories)
    }

    /// Number of cached genes.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn gene_count(&self) -> Result<usize> {
        count_rows(&self.conn, "genes")
    }

    /// Number of categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn category_count(&self) -> Result<usize> {
        count_rows(&self.conn, "categories")
    }

    /// The extended-detail payload of a cached gene, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::UnknownGene`] if the gene is not cached.
    pub fn extended_data(&self, symbol: &str) -> Result<Option<String>> {
        let symbol = normalize_symbol(symbol);
        let row: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT extended_data FROM genes WHERE symbol = ?1",
                [&symbol],
                |row| row.get(0),
            )
            .optional()
            .context("query extended data")?;
        row.ok_or_else(|| PpiError::UnknownGene(symbol).into())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create a category, or return the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::CacheWrite`] if the transaction fails.
    #[instrument(skip(self))]
    pub fn create_category(&mut self, name: &str, color: &str) -> Result<Category> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PpiError::InvalidInput("category name is empty".to_string()).into());
        }
        self.write("create category", |tx| {
            insert_category(tx, &name, color)?;
            tx.query_row(
                "SELECT id, name, color FROM categories WHERE name = ?1",
                [&name],
                category_from_row,
            )
        })
    }

    /// Insert or update genes in one transaction.
    ///
    /// Returns the number of rows written. On any failure nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::CacheWrite`] if any row fails (for example a
    /// `category_id` that does not exist).
    #[instrument(skip(self, genes), fields(genes = genes.len()))]
    pub fn bulk_upsert_genes(&mut self, genes: &[GeneInput]) -> Result<usize> {
        if genes.is_empty() {
            return Ok(0);
        }
        let written = self.write("bulk upsert genes", |tx| {
            let mut written = 0;
            for gene in genes {
                upsert_gene(tx, &normalize_symbol(&gene.symbol), gene.category_id, &gene.description)?;
                written += 1;
            }
            Ok(written)
        })?;
        info!(written, "cached genes");
        Ok(written)
    }

    /// Create approved categories and insert pending genes atomically.
    ///
    /// Category ids are resolved inside the transaction. A pending gene
    /// whose category is neither already cached nor in `categories` is
    /// skipped and reported in [`CommitReport::skipped`]. A committed gene
    /// never changes here: a pending gene whose symbol is already cached is
    /// reported in [`CommitReport::already_cached`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::CacheWrite`] if the transaction fails; nothing is
    /// written in that case.
    #[instrument(skip(self, categories, genes), fields(categories = categories.len(), genes = genes.len()))]
    pub fn commit_enrichment(
        &mut self,
        categories: &[NewCategory],
        genes: &[PendingGene],
    ) -> Result<CommitReport> {
        let report = self.write("commit enrichment", |tx| {
            let mut report = CommitReport::default();
            for category in categories {
                let name = category.name.trim();
                if name.is_empty() {
                    continue;
                }
                report.categories_created += insert_category(tx, name, &category.color)?;
            }

            let mut ids: HashMap<String, Option<i64>> = HashMap::new();
            for gene in genes {
                let folded = gene.category.trim().to_ascii_lowercase();
                let id = match ids.get(&folded) {
                    Some(id) => *id,
                    None => {
                        let id = tx
                            .query_row(
                                "SELECT id FROM categories WHERE name = ?1",
                                [gene.category.trim()],
                                |row| row.get::<_, i64>(0),
                            )
                            .optional()?;
                        ids.insert(folded, id);
                        id
                    }
                };

                let symbol = normalize_symbol(&gene.symbol);
                match id {
                    Some(category_id) if !symbol.is_empty() => {
                        if insert_new_gene(tx, &symbol, category_id, &gene.description)? == 1 {
                            report.genes_written += 1;
                        } else {
                            report.already_cached.push(symbol);
                        }
                    }
                    _ => report.skipped.push(symbol),
                }
            }
            Ok(report)
        })?;

        if !report.skipped.is_empty() {
            warn!(skipped = ?report.skipped, "pending genes referenced unapproved categories");
        }
        if !report.already_cached.is_empty() {
            debug!(already_cached = ?report.already_cached, "kept existing gene rows");
        }
        info!(
            categories_created = report.categories_created,
            genes_written = report.genes_written,
            "committed enrichment"
        );
        Ok(report)
    }

    /// Store the extended-detail payload for a cached gene.
    ///
    /// # Errors
    ///
    /// Returns [`PpiError::UnknownGene`] if the gene is not cached, or
    /// [`PpiError::CacheWrite`] if the update fails.
    pub fn set_extended_data(&mut self, symbol: &str, payload: &str) -> Result<()> {
        let symbol = normalize_symbol(symbol);
        let updated = self.write("store extended data", |tx| {
            tx.execute(
                "UPDATE genes SET extended_data = ?2 WHERE symbol = ?1",
                params![symbol, payload],
            )
        })?;
        if updated == 0 {
            return Err(PpiError::UnknownGene(symbol).into());
        }
        Ok(())
    }

    /// Run `op` in a transaction, mapping any failure to a rolled-back
    /// [`PpiError::CacheWrite`].
    fn write<T>(
        &mut self,
        what: &str,
        op: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let tx = self
            .conn
            .transaction()
            .map_err(|err| PpiError::CacheWrite(format!("{what}: begin: {err}")))?;

        // Dropping `tx` on the error path rolls it back.
        let value = op(&tx).map_err(|err| PpiError::CacheWrite(format!("{what}: {err}")))?;

        tx.commit()
            .map_err(|err| PpiError::CacheWrite(format!("{what}: commit: {err}")))?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let n: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .with_context(|| format!("count {table}"))?;
    Ok(usize::try_from(n).unwrap_or_default())
}

/// Insert a category if its name is new. Returns 1 if inserted, else 0.
fn insert_category(tx: &Transaction<'_>, name: &str, color: &str) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT INTO categories (name, color) VALUES (?1, ?2)
         ON CONFLICT(name) DO NOTHING",
        params![name, color],
    )
}

fn upsert_gene(
    tx: &Transaction<'_>,
    symbol: &str,
    category_id: i64,
    description: &str,
) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT INTO genes (symbol, category_id, description) VALUES (?1, ?2, ?3)
         ON CONFLICT(symbol) DO UPDATE SET
             category_id = excluded.category_id,
             description = excluded.description",
        params![symbol, category_id, description],
    )
}

/// Insert a gene only if its symbol is new. Returns 1 if inserted, else 0.
fn insert_new_gene(
    tx: &Transaction<'_>,
    symbol: &str,
    category_id: i64,
    description: &str,
) -> rusqlite::Result<usize> {
    tx.execute(
        "INSERT INTO genes (symbol, category_id, description) VALUES (?1, ?2, ?3)
         ON CONFLICT(symbol) DO NOTHING",
        params![symbol, category_id, description],
    )
}
