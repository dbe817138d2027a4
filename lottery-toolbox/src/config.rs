use crate::host::DEFAULT_HOST_PIN;
use crate::markers::geocode::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use crate::records::DEFAULT_MAX_RECORDS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DATA_DIR: &str = "lottery-data";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Toolbox settings, read from a JSON file. Every field is optional.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolboxConfig {
    /// Directory holding the persisted state.
    pub data_dir: PathBuf,
    pub max_records: usize,
    /// PIN used until the host sets one.
    pub default_host_pin: String,
    pub nominatim_url: String,
    pub user_agent: String,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_records: DEFAULT_MAX_RECORDS,
            default_host_pin: DEFAULT_HOST_PIN.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ToolboxConfig {
    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}
