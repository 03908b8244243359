//! Shared application state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use astra_config::GatewayConfig;
use reqwest::{redirect, Client};

/// Read-only after start; shared by every request.
pub struct AppState {
    pub config: GatewayConfig,
    /// Upstream client. No overall timeout, so long-lived streams stay open.
    pub upstream: Client,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let upstream = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { config, upstream })
    }
}

pub type SharedState = Arc<AppState>;
