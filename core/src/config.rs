//! Board configuration — source selection, tick periods, seed.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{BoardError, BoardResult},
    refresher::REFRESH_INTERVAL_MS,
    simulator::SIM_INTERVAL_MS,
    source::{
        RepositorySource, ServiceStatusSource, StatusSource, REPOSITORY_API_BASE,
        SERVICE_API_BASE,
    },
    types::Seed,
};

/// Which external API the status block polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Minecraft-style service status, e.g. host "play.example.org".
    Service {
        host: String,
        #[serde(default = "default_service_api_base")]
        api_base: String,
    },
    /// Source-hosting repository, slug "owner/repo".
    Repository {
        slug: String,
        #[serde(default = "default_repository_api_base")]
        api_base: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub source: SourceConfig,

    #[serde(default = "default_sim_interval")]
    pub sim_interval_ms: u64,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_seed")]
    pub seed: Seed,

    /// Optional bearer credential passed through to the source.
    #[serde(default)]
    pub credential: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::Service {
                host:     "play.example.org".to_string(),
                api_base: default_service_api_base(),
            },
            sim_interval_ms: default_sim_interval(),
            refresh_interval_ms: default_refresh_interval(),
            seed: default_seed(),
            credential: None,
        }
    }
}

impl BoardConfig {
    pub fn load(path: &Path) -> BoardResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BoardError::Other(anyhow::anyhow!("read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Build the concrete source this config names.
    pub fn build_source(&self) -> Arc<dyn StatusSource> {
        match &self.source {
            SourceConfig::Service { host, api_base } => Arc::new(
                ServiceStatusSource::with_api_base(host.clone(), api_base.clone()),
            ),
            SourceConfig::Repository { slug, api_base } => Arc::new(
                RepositorySource::with_api_base(slug.clone(), api_base.clone()),
            ),
        }
    }
}

fn default_service_api_base() -> String {
    SERVICE_API_BASE.to_string()
}

fn default_repository_api_base() -> String {
    REPOSITORY_API_BASE.to_string()
}

fn default_sim_interval() -> u64 {
    SIM_INTERVAL_MS
}

fn default_refresh_interval() -> u64 {
    REFRESH_INTERVAL_MS
}

fn default_seed() -> Seed {
    42
}
