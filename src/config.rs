//! Application configuration management.
//!
//! Values are layered with `figment`, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory, or an explicit file
//! 3. Environment variables prefixed with `MEDIADUPE_`
//!
//! Command-line flags are applied on top by the caller.
//!
//! ```toml
//! pattern = "/media/card/**"
//! extensions = [".jpg", ".mp4"]
//! io_threads = 8
//! backup_dir = "/media/backup"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::{normalize_extensions, DEFAULT_EXTENSIONS};

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "MEDIADUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob pattern selecting candidate files.
    pub pattern: String,
    /// Accepted extensions (with leading dot). Empty accepts every file.
    pub extensions: Vec<String>,
    /// Worker threads used for fingerprinting.
    pub io_threads: usize,
    /// Folder receiving a copy of each kept file before cleanup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: "**".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            io_threads: 4,
            backup_dir: None,
        }
    }
}

impl Config {
    /// Load the configuration from defaults, the platform config file and
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or an environment variable holds
    /// a value of the wrong type.
    pub fn load() -> Result<Self> {
        let figment = match Self::config_path() {
            Ok(path) => Self::figment_with(&path),
            Err(e) => {
                log::debug!("No config directory, using defaults: {}", e);
                Figment::from(Serialized::defaults(Self::default())).merge(Self::env())
            }
        };
        Self::extract(figment)
    }

    /// Load the configuration using `path` instead of the platform file.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::extract(Self::figment_with(path))
    }

    fn figment_with(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self> {
        let mut config: Self = figment.extract().context("Invalid configuration")?;
        config.extensions = normalize_extensions(std::mem::take(&mut config.extensions));
        config.io_threads = config.io_threads.max(1);
        Ok(config)
    }

    /// Save the configuration to the platform config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the configuration as TOML to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to encode config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "mediadupe", "mediadupe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
