//! Configuration - `Weft.toml` の読み込みと検証
//!
//! ```toml
//! environment = "production"   # or "development" (default)
//! log_level = "debug"          # optional
//!
//! [pagination]
//! default_per_page = 15
//! max_per_page = 100
//! ```
//!
//! Every key is optional; missing keys fall back to `Default`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deployment environment. Decides how much error detail leaves the api layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 15,
            max_per_page: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub log_level: Option<String>,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file at {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing TOML config from {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pagination;
        if p.default_per_page == 0 {
            return Err(ConfigError::Invalid(
                "pagination.default_per_page must be at least 1".into(),
            ));
        }
        if p.default_per_page > p.max_per_page {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_per_page ({}) exceeds max_per_page ({})",
                p.default_per_page, p.max_per_page
            )));
        }
        Ok(())
    }
}

/// Read, parse and validate a config file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Like [`load_from_path`], but a missing file yields `AppConfig::default()`.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_from_path(path)
}

/// `Weft.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Weft.toml")
}
