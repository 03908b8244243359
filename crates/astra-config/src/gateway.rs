//! Gateway (reverse proxy) settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{first_set, parse_var, read_toml, ConfigError, Result, CONFIG_PATH_VAR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL every API request is forwarded to.
    #[serde(default = "default_upstream_base")]
    pub upstream_base: String,
    /// Directory of ingested documents, exposed read-only.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Built client bundle; must contain `index.html`.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_host()            -> String  { "0.0.0.0".to_string() }
fn default_port()            -> u16     { 3000 }
fn default_upstream_base()   -> String  { "http://rust-engine:8000".to_string() }
fn default_storage_dir()     -> PathBuf { PathBuf::from("/app/storage") }
fn default_dist_dir()        -> PathBuf { PathBuf::from("dist") }
fn default_api_prefix()      -> String  { "/api".to_string() }
fn default_storage_prefix()  -> String  { "/storage".to_string() }
fn default_connect_timeout() -> u64     { 10 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_base: default_upstream_base(),
            storage_dir: default_storage_dir(),
            dist_dir: default_dist_dir(),
            api_prefix: default_api_prefix(),
            storage_prefix: default_storage_prefix(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Resolve from the process environment.
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable source.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match first_set(&lookup, &[CONFIG_PATH_VAR]) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(&lookup)?;
        config.normalize()?;
        debug!(?config, "gateway config resolved");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = first_set(lookup, &["HOST"]) {
            self.host = v;
        }
        if let Some(v) = first_set(lookup, &["PORT"]) {
            self.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = first_set(lookup, &["RUST_ENGINE_BASE", "RUST_ENGINE_URL"]) {
            self.upstream_base = v;
        }
        if let Some(v) = first_set(lookup, &["ASTRA_STORAGE"]) {
            self.storage_dir = PathBuf::from(v);
        }
        if let Some(v) = first_set(lookup, &["ASTRA_DIST_DIR"]) {
            self.dist_dir = PathBuf::from(v);
        }
        if let Some(v) = first_set(lookup, &["ASTRA_API_PREFIX"]) {
            self.api_prefix = v;
        }
        if let Some(v) = first_set(lookup, &["ASTRA_STORAGE_PREFIX"]) {
            self.storage_prefix = v;
        }
        if let Some(v) = first_set(lookup, &["ASTRA_CONNECT_TIMEOUT_SECS"]) {
            self.connect_timeout_secs = parse_var("ASTRA_CONNECT_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        self.upstream_base = self.upstream_base.trim_end_matches('/').to_string();
        if !self.upstream_base.starts_with("http://") && !self.upstream_base.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "RUST_ENGINE_BASE",
                message: format!("{:?} is not an http(s) URL", self.upstream_base),
            });
        }
        self.api_prefix = normalize_prefix("ASTRA_API_PREFIX", &self.api_prefix)?;
        self.storage_prefix = normalize_prefix("ASTRA_STORAGE_PREFIX", &self.storage_prefix)?;
        if self.api_prefix == self.storage_prefix {
            return Err(ConfigError::Invalid {
                key: "ASTRA_STORAGE_PREFIX",
                message: "must differ from the API prefix".to_string(),
            });
        }
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Entry document served for client-side routes.
    pub fn index_file(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}

fn normalize_prefix(key: &'static str, raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(ConfigError::Invalid {
            key,
            message: format!("{raw:?} must start with '/' and name a path segment"),
        });
    }
    Ok(trimmed.to_string())
}
