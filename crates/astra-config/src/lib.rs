//! Configuration loading for Astra.
//!
//! Values resolve in three layers: built-in defaults, an optional TOML file
//! named by `ASTRA_CONFIG`, then individual environment variables.

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod client;
pub mod gateway;


pub use client::ClientConfig;
pub use gateway::GatewayConfig;

/// Env var naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "ASTRA_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Read and deserialize a TOML file.
pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path: display, source })
}

/// Parse an env override, naming the key on failure.
pub(crate) fn parse_var<T>(key: &'static str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: format!("{raw:?}: {e}"),
    })
}

/// First non-empty value among `keys`.
pub(crate) fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|&k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
