use std::path::PathBuf;

use agentmem_storage::{StorageLayout, DEFAULT_DATA_DIR};
use serde::Serialize;

pub const DATA_DIR_ENV: &str = "MCP_DATA_DIR";
pub const LOG_FILTER_ENV: &str = "AGENTMEM_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Identity reported in the `initialize` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub log_filter: String,
    pub server_info: ServerInfo,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let data_dir = non_empty(DATA_DIR_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let log_filter =
            non_empty(LOG_FILTER_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self {
            data_dir,
            log_filter,
            server_info: ServerInfo::default(),
        }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.data_dir)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
