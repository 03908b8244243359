//! astra-client: talks to the analysis engine through the gateway.
//!
//!   - `api`      engine HTTP contract behind the `EngineApi` trait
//!   - `client`   submit a query and poll it to a terminal state
//!   - `render`   turn a terminal payload into a display document
//!   - `files`    ingested-document listing helpers
//!   - `session`  chat transcript driven by a `QueryClient`

pub mod api;
pub mod cancel;
pub mod client;
pub mod files;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{EngineApi, HttpEngineApi};
pub use cancel::CancellationToken;
pub use client::{QueryClient, POLL_INTERVAL, POLL_TIMEOUT};
pub use render::{render, Citation, DisplayDocument};
pub use session::{ChatEntry, ChatSession, Role};
