use thiserror::Error;

/// Everything a query round-trip or a file listing can fail with.
///
/// The `Display` text is what the chat transcript shows to the user.
#[derive(Debug, Error)]
pub enum AstraError {
    #[error("Query creation did not return an id")]
    Creation,

    #[error("{0}")]
    QueryFailed(String),

    #[error("Query was cancelled")]
    QueryCancelled,

    #[error("Query was not found")]
    QueryNotFound,

    #[error("Timed out waiting for the query to finish")]
    QueryTimeout,

    #[error("Query polling was aborted")]
    PollingAborted,

    #[error("Please wait for the current response to finish.")]
    ConcurrentQuery,

    #[error("{0}")]
    ListFiles(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AstraError {
    /// True for the errors that end a poll loop on an engine-reported state.
    pub fn is_terminal_status(&self) -> bool {
        matches!(
            self,
            AstraError::QueryFailed(_) | AstraError::QueryCancelled | AstraError::QueryNotFound
        )
    }
}

pub type Result<T> = std::result::Result<T, AstraError>;
