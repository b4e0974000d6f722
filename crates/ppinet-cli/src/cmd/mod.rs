pub mod analyze;
pub mod approve;
pub mod categories;
pub mod detail;
pub mod drugs;
pub mod init;
pub mod lookup;
pub mod protein;
pub mod seed;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ppinet_core::KnowledgeCache;
use ppinet_core::classify::{Classifier, HttpClassifier, OfflineClassifier};
use ppinet_core::config::{PpiConfig, load_config};
use ppinet_core::drugs::DgidbClient;
use ppinet_core::evidence::StringDbClient;
use tracing::warn;

use crate::output::OutputMode;

/// Resolved settings shared by every command.
pub struct Context {
    pub config: PpiConfig,
    pub db_path: PathBuf,
    pub output: OutputMode,
}

impl Context {
    /// Load `ppinet.toml` and resolve the cache path. `--db` wins over
    /// `PPINET_DB`, which wins over the config file.
    pub fn load(config: Option<&Path>, db: Option<PathBuf>, output: OutputMode) -> Result<Self> {
        let config = load_config(config)?;
        let db_path = db.unwrap_or_else(|| config.database_path());
        Ok(Self {
            config,
            db_path,
            output,
        })
    }

    pub fn open_cache(&self) -> Result<KnowledgeCache> {
        KnowledgeCache::open(&self.db_path)
            .with_context(|| format!("open knowledge cache at {}", self.db_path.display()))
    }

    /// The HTTP classifier when an endpoint and key are configured,
    /// otherwise one that defaults every gene.
    pub fn classifier(&self) -> Box<dyn Classifier> {
        let settings = &self.config.classifier;
        match (&settings.endpoint, settings.api_key()) {
            (Some(endpoint), Some(key)) => {
                Box::new(HttpClassifier::new(endpoint.clone(), key, settings.timeout()))
            }
            (Some(_), None) => {
                warn!(
                    env = %settings.api_key_env,
                    "classifier endpoint configured but API key variable is unset; running offline"
                );
                Box::new(OfflineClassifier)
            }
            (None, _) => Box::new(OfflineClassifier),
        }
    }

    pub fn evidence(&self) -> StringDbClient {
        let settings = &self.config.evidence;
        StringDbClient::new(
            settings.base_url.clone(),
            settings.species,
            settings.caller_identity.clone(),
            settings.timeout(),
        )
    }

    pub fn dgidb(&self) -> DgidbClient {
        let settings = &self.config.drugs;
        DgidbClient::new(settings.base_url.clone(), settings.timeout())
    }
}
