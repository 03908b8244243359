//! astra-common: Shared types and errors used across all Astra crates.

pub mod error;
pub mod query;
pub mod files;

// Re-export commonly used types
pub use error::{AstraError, Result};
pub use files::{FileSummary, ImportSummary};
pub use query::{CreateQueryRequest, FileReference, Query, QueryResult, QueryStatus};
