//! Query client settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{first_set, parse_var, read_toml, Result, CONFIG_PATH_VAR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the gateway the client talks to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// URL prefix under which ingested documents are downloadable.
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
}

fn default_base_url()       -> String { "http://localhost:3000".to_string() }
fn default_top_k()          -> u32    { 5 }
fn default_storage_prefix() -> String { "/storage".to_string() }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_k: default_top_k(),
            storage_prefix: default_storage_prefix(),
        }
    }
}

/// Only the `[client]` table of a shared config file is read.
#[derive(Deserialize)]
struct ClientFile {
    #[serde(default)]
    client: Option<ClientConfig>,
}

impl ClientConfig {
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match first_set(&lookup, &[CONFIG_PATH_VAR]) {
            Some(path) => read_toml::<ClientFile>(Path::new(&path))?
                .client
                .unwrap_or_default(),
            None => Self::default(),
        };
        if let Some(v) = first_set(&lookup, &["ASTRA_GATEWAY_URL"]) {
            config.base_url = v;
        }
        if let Some(v) = first_set(&lookup, &["ASTRA_TOP_K"]) {
            config.top_k = parse_var("ASTRA_TOP_K", &v)?;
        }
        if let Some(v) = first_set(&lookup, &["ASTRA_STORAGE_PREFIX"]) {
            config.storage_prefix = v;
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.storage_prefix = config.storage_prefix.trim_end_matches('/').to_string();
        Ok(config)
    }
}
