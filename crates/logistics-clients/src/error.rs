//! Client error types
//!
//! Every failure talking to Notion, Airtable or Slack is reported through
//! [`ClientError`]. Tools turn its display string into the `error` field of
//! their structured output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status with the service's own error message
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Slack answered `ok: false`; the payload is Slack's error code
    #[error("{0}")]
    Slack(String),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Bad base URL or other local misconfiguration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        ClientError::Config(msg.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
