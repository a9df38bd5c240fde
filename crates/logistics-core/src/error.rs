//! Error types raised before a tool body runs.

use thiserror::Error;

/// Errors surfaced by the tool layer itself.
///
/// Remote service failures are not represented here: tools report those in
/// their structured output with `status = "error"`.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed to deserialize or violated a declared bound
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool with this name is registered
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// The key-value connection for an app id was never configured
    #[error("Connection '{0}' is not configured")]
    MissingConnection(String),

    /// A configured connection lacks a required key
    #[error("Connection '{app_id}' is missing key '{key}'")]
    MissingConnectionKey { app_id: String, key: String },
}

impl ToolError {
    /// Create an invalid-arguments error
    pub fn invalid(msg: impl Into<String>) -> Self {
        ToolError::InvalidArguments(msg.into())
    }

    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, ToolError::InvalidArguments(_))
    }
}
