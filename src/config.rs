//! # Configuration
//!
//! Defaults for the `encrypt` and `decrypt` commands can be kept in a
//! `.veil.toml` next to the environment files:
//!
//! ```toml
//! cipher = "AES-256-CBC"
//! only = ["*_KEY", "*_SECRET", "*_PASSWORD", "*_TOKEN"]
//! only_values = true
//! ```
//!
//! Environment variables override the file:
//!
//! - `VEIL_CIPHER`
//! - `VEIL_ONLY` (comma-separated patterns)
//! - `VEIL_ONLY_VALUES` (`true` / `false`)
//!
//! Command line flags override both.

use crate::crypto::Cipher;
use crate::error::{Result, VeilError};
use crate::policy::{split_patterns, DEFAULT_PATTERNS};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = ".veil.toml";
const ENV_PREFIX: &str = "VEIL_";

/// Environment variable holding the encryption key.
pub const KEY_ENV: &str = "LARAVEL_ENV_ENCRYPTION_KEY";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VeilConfig {
    #[serde(default)]
    pub cipher: Option<String>,
    #[serde(default = "default_only")]
    pub only: Vec<String>,
    #[serde(default)]
    pub only_values: bool,
}

fn default_only() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for VeilConfig {
    fn default() -> Self {
        Self {
            cipher: None,
            only: default_only(),
            only_values: false,
        }
    }
}

impl VeilConfig {
    /// Cipher from configuration, falling back to `AES-256-CBC`.
    pub fn cipher(&self) -> Result<Cipher> {
        match &self.cipher {
            Some(name) => name.parse(),
            None => Ok(Cipher::default()),
        }
    }
}

/// Load `.veil.toml` from `base_dir` and apply environment overrides.
pub fn load_config(base_dir: &Path) -> Result<VeilConfig> {
    let config_path = base_dir.join(CONFIG_FILE);

    let mut cfg = if config_path.exists() {
        debug!(path = %config_path.display(), "loading configuration");
        Config::builder()
            .add_source(File::new(
                config_path
                    .to_str()
                    .ok_or_else(|| VeilError::Config("Invalid config path".into()))?,
                FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize::<VeilConfig>())
            .map_err(|err| VeilError::Config(format!("Failed to load {CONFIG_FILE}: {err}")))?
    } else {
        VeilConfig::default()
    };

    if let Ok(cipher) = env::var(format!("{ENV_PREFIX}CIPHER")) {
        cfg.cipher = Some(cipher);
    }
    if let Ok(only) = env::var(format!("{ENV_PREFIX}ONLY")) {
        cfg.only = split_patterns(&only);
    }
    if let Ok(only_values) = env::var(format!("{ENV_PREFIX}ONLY_VALUES")) {
        cfg.only_values = only_values.parse().map_err(|_| {
            VeilError::Config(format!("{ENV_PREFIX}ONLY_VALUES must be true or false, got {only_values:?}"))
        })?;
    }

    Ok(cfg)
}
