//! Site configuration.
//!
//! Read from a JSON file (`--config`, or the user's config directory), then
//! overridden from `SHOWCASE_*` environment variables. A missing file means
//! defaults; a broken one is logged and ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::ProjectInput;
use crate::registry::Registry;

const APP_NAME: &str = "portfolio-showcase";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the built portfolio site.
    pub root: PathBuf,
    pub port: u16,
    pub loader: LoaderConfig,
    pub cache: CacheConfig,
    pub transition: TransitionConfig,
    /// Enables arrow/Home/End browsing between demos while the modal is open.
    pub browse_keys: bool,
    /// Replaces the builtin registry when present.
    pub projects: Option<Vec<ProjectInput>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 8080,
            loader: LoaderConfig::default(),
            cache: CacheConfig::default(),
            transition: TransitionConfig::default(),
            browse_keys: true,
            projects: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub timeout_backoff_ms: u64,
    pub error_backoff_ms: u64,
    /// How long a preload surface lives before it is removed.
    pub preload_ttl_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            timeout_backoff_ms: 1_000,
            error_backoff_ms: 2_000,
            preload_ttl_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Version tag appended to every bucket name.
    pub version: String,
    /// Site-shell assets cached on install. Install fails if any is missing.
    pub static_assets: Vec<String>,
    /// Cross-origin hosts the cache layer is allowed to handle.
    pub allowed_origins: Vec<String>,
    pub demos_prefix: String,
    pub placeholder_image: String,
    /// Total bytes the storage may hold; unlimited when absent.
    pub quota_bytes: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            static_assets: [
                "/",
                "/index.html",
                "/styles.css",
                "/script.js",
                "/manifest.json",
                "/images/placeholder.svg",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            allowed_origins: [
                "fonts.googleapis.com",
                "fonts.gstatic.com",
                "cdnjs.cloudflare.com",
                "cdn.jsdelivr.net",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            demos_prefix: "/demos/".to_string(),
            placeholder_image: "/images/placeholder.svg".to_string(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self { duration_ms: 400 }
    }
}

/// Presentation settings served to the portfolio page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub browse_keys: bool,
    pub transition_ms: u64,
    pub load_timeout_ms: u64,
    pub max_retries: u32,
    pub preload_ttl_ms: u64,
}

impl TransitionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl SiteConfig {
    /// Load from `path` (or the default location) and apply env overrides.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env();
        config
    }

    fn try_load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(root) = std::env::var("SHOWCASE_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(port) = std::env::var("SHOWCASE_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.port = port;
        }
        if let Ok(version) = std::env::var("SHOWCASE_CACHE_VERSION") {
            self.cache.version = version;
        }
    }

    /// What the portfolio page needs to drive presentation and transitions.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            browse_keys: self.browse_keys,
            transition_ms: self.transition.duration_ms,
            load_timeout_ms: self.loader.timeout_ms,
            max_retries: self.loader.max_retries,
            preload_ttl_ms: self.loader.preload_ttl_ms,
        }
    }

    /// The configured project list, or the builtin one.
    pub fn registry(&self) -> Result<Registry> {
        match &self.projects {
            Some(inputs) => Registry::from_inputs(inputs.clone()).context("Invalid project list"),
            None => Ok(Registry::builtin()),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
