//! Configuration file handling
//!
//! A JSON file telling the tool where its data comes from and how to render:
//!
//! ```json
//! {
//!   "source": { "type": "http", "base_url": "http://localhost:5000", "timeout_secs": 30 },
//!   "aux_basis_type_default": "AUX_FIT",
//!   "log_filter": "info"
//! }
//! ```
//!
//! Command-line flags override the file, see `AppConfig::with_overrides`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::render::RenderOptions;
use crate::source::{DataSource, LibrarySource};
use crate::types::BasisType;

/// Default webservice used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where catalogs and variant tables are read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Local JSON library file
    Library { path: PathBuf },
    /// Remote webservice
    Http {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Http {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    /// Open the configured data source
    pub fn open(&self) -> Result<Box<dyn DataSource>> {
        match self {
            Self::Library { path } => {
                let source = LibrarySource::load(path)
                    .with_context(|| format!("Failed to load library {path:?}"))?;
                Ok(Box::new(source))
            }
            #[cfg(feature = "http")]
            Self::Http { base_url, timeout_secs } => {
                let source = crate::source::HttpSource::new(
                    base_url.clone(),
                    std::time::Duration::from_secs(*timeout_secs),
                )?;
                Ok(Box::new(source))
            }
            #[cfg(not(feature = "http"))]
            Self::Http { base_url, .. } => {
                anyhow::bail!("Cannot reach {base_url}: built without the `http` feature")
            }
        }
    }
}

/// Application configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Type written for auxiliary basis sets whose catalog entry has none
    #[serde(default = "default_aux_basis_type")]
    pub aux_basis_type_default: BasisType,
    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_aux_basis_type() -> BasisType {
    BasisType::AuxFit
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            aux_basis_type_default: default_aux_basis_type(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Library { path } => {
                if path.as_os_str().is_empty() {
                    anyhow::bail!("Library path must be specified");
                }
            }
            SourceConfig::Http { base_url, timeout_secs } => {
                let url = base_url.trim();
                if url.is_empty() {
                    anyhow::bail!("Base URL must be specified");
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("Base URL must start with http:// or https://");
                }
                if *timeout_secs == 0 {
                    anyhow::bail!("Timeout must be at least 1 second");
                }
            }
        }

        if self.aux_basis_type_default.is_orbital() {
            anyhow::bail!("Default auxiliary basis type cannot be ORB");
        }

        if self.log_filter.trim().is_empty() {
            anyhow::bail!("Log filter must not be empty");
        }

        Ok(())
    }

    /// Apply command-line overrides; a library path wins over a URL
    pub fn with_overrides(mut self, library: Option<PathBuf>, url: Option<String>) -> Self {
        if let Some(base_url) = url {
            let timeout_secs = match self.source {
                SourceConfig::Http { timeout_secs, .. } => timeout_secs,
                SourceConfig::Library { .. } => DEFAULT_TIMEOUT_SECS,
            };
            self.source = SourceConfig::Http { base_url, timeout_secs };
        }
        if let Some(path) = library {
            self.source = SourceConfig::Library { path };
        }
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            aux_basis_type: self.aux_basis_type_default.clone(),
        }
    }
}
