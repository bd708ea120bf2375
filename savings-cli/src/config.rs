//! TOML configuration for the `savings` CLI.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [store]
//! backend = "sqlite"              # or "memory"
//! connection_string = "savings.db"
//!
//! [share]
//! base_url = "https://estimator.example/"
//! param = "s"
//!
//! [fees]
//! rate = "0.10"
//! flat_surcharge = "1500"
//! surcharge_category = "access_control"
//!
//! [log]
//! level = "warn"
//! file = "savings.log"
//! ```

use std::path::{Path, PathBuf};

use savings_core::FeeSchedule;
use savings_core::reconcile::SHARE_PARAM;
use savings_core::store::StoreConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "savings.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Location the shareable URL is built on when no link is supplied.
    pub base_url: String,
    /// Query parameter carrying the state.
    pub param: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://estimator.example/".to_string(),
            param: SHARE_PARAM.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub store: StoreConfig,
    pub share: ShareConfig,
    pub fees: FeeSchedule,
    pub log: LogConfig,
}

impl EstimatorConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Loads `explicit` if given, failing when it is missing. Otherwise
    /// loads [`DEFAULT_CONFIG_FILE`] if it exists, or falls back to the
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve(explicit, Path::new(DEFAULT_CONFIG_FILE))
    }

    fn resolve(
        explicit: Option<&Path>,
        default_path: &Path,
    ) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if default_path.is_file() => Self::from_file(default_path),
            None => {
                debug!(path = %default_path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
        }
    }
}
