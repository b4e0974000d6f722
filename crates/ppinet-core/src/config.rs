use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PpiError;
use crate::model::DEFAULT_CATEGORY_COLOR;

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE_NAME: &str = "ppinet.toml";

/// Environment variable that overrides `database.path`.
pub const DB_ENV_VAR: &str = "PPINET_DB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PpiConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub drugs: DrugsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Cache location. `None` means the per-user data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_evidence_url")]
    pub base_url: String,
    /// NCBI taxonomy id. Only human (9606) is exercised.
    #[serde(default = "default_species")]
    pub species: u32,
    #[serde(default = "default_caller_identity")]
    pub caller_identity: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_evidence_url(),
            species: default_species(),
            caller_identity: default_caller_identity(),
            timeout_secs: default_timeout_secs(),
            default_confidence: default_confidence(),
        }
    }
}

impl EvidenceConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Classification endpoint. Without one every miss gets the default
    /// classification.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key from the configured environment variable, if set and
    /// non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Upper bound on concurrent classifier requests per enrichment.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_category_color")]
    pub default_category_color: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_category_color: default_category_color(),
        }
    }
}

/// Drug-interaction lookups against DGIdb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugsConfig {
    #[serde(default = "default_drugs_url")]
    pub base_url: String,
    #[serde(default = "default_drugs_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DrugsConfig {
    fn default() -> Self {
        Self {
            base_url: default_drugs_url(),
            timeout_secs: default_drugs_timeout_secs(),
        }
    }
}

impl DrugsConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PpiConfig {
    /// Resolve the cache path: `PPINET_DB`, then `database.path`, then the
    /// per-user data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        resolve_database_path(env::var(DB_ENV_VAR).ok(), self.database.path.as_deref())
    }
}

fn resolve_database_path(env_override: Option<String>, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = env_override.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    dirs::data_dir().map_or_else(
        || PathBuf::from("ppinet-genes.db"),
        |dir| dir.join("ppinet").join("genes.db"),
    )
}

/// Load configuration.
///
/// With an explicit path the file must exist. Otherwise `ppinet.toml` in
/// the working directory is used when present, and defaults when not.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or
/// [`PpiError::ConfigParse`] if it is not valid TOML for this schema.
pub fn load_config(explicit: Option<&Path>) -> Result<PpiConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(PpiError::InvalidInput(format!(
                    "config file {} does not exist",
                    path.display()
                ))
                .into());
            }
            path.to_path_buf()
        }
        None => {
            let candidate = PathBuf::from(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(PpiConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content, &path)
}

/// Parse configuration text; `origin` only labels errors.
///
/// # Errors
///
/// Returns [`PpiError::ConfigParse`] on invalid TOML or mistyped fields.
pub fn parse_config(content: &str, origin: &Path) -> Result<PpiConfig> {
    toml::from_str::<PpiConfig>(content).map_err(|err| {
        PpiError::ConfigParse {
            path: origin.display().to_string(),
            reason: err.to_string(),
        }
        .into()
    })
}

fn default_evidence_url() -> String {
    "https://string-db.org/api".to_string()
}

const fn default_species() -> u32 {
    9606
}

fn default_caller_identity() -> String {
    "ppinet".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_confidence() -> f64 {
    0.4
}

fn default_drugs_url() -> String {
    "https://dgidb.org/api/v2".to_string()
}

const fn default_drugs_timeout_secs() -> u64 {
    15
}

fn default_api_key_env() -> String {
    "PPINET_CLASSIFIER_KEY".to_string()
}

const fn default_max_concurrency() -> usize {
    8
}

fn default_category_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}
