//! Canonical `SQLite` schema for the gene knowledge cache.
//!
//! Two tables:
//! - `categories` holds the append-only set of functional categories and
//!   their display colors
//! - `genes` maps each uppercase symbol to one category plus a description
//!   and an optional opaque extended-detail payload

/// Migration v1: both tables and the default category palette.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE CHECK (length(trim(name)) > 0),
    color TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS genes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL UNIQUE CHECK (symbol = upper(trim(symbol)) AND length(symbol) > 0),
    category_id INTEGER NOT NULL REFERENCES categories(id),
    description TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_genes_category_id ON genes(category_id);

INSERT OR IGNORE INTO categories (name, color) VALUES
    ('Tumor Suppressor', '#ff3333'),
    ('Oncogene', '#00ff88'),
    ('Kinase', '#ffaa00'),
    ('Transcription Factor', '#bc13fe'),
    ('Other', '#808080');
";

/// Migration v2: lazily-populated extended detail payload on genes.
pub const MIGRATION_V2_SQL: &str = r"
ALTER TABLE genes ADD COLUMN extended_data TEXT;
";

/// Indexes expected to exist after all migrations.
pub const REQUIRED_INDEXES: &[&str] = &["idx_genes_category_id"];

/// Categories seeded by migration v1, in insertion order.
pub const SEEDED_CATEGORIES: &[(&str, &str)] = &[
    ("Tumor Suppressor", "#ff3333"),
    ("Oncogene", "#00ff88"),
    ("Kinase", "#ffaa00"),
    ("Transcription Factor", "#bc13fe"),
    ("Other", "#808080"),
];
