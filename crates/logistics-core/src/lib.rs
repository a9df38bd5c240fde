//! Core traits and shared data models for the production logistics tools.
//! The types here stay free of any HTTP stack so the client and tool crates
//! can compose them, and so an orchestrator can drive tools through a single
//! registry.

pub mod config;
pub mod connections;
pub mod error;
pub mod messaging;
pub mod tools;

pub use config::{mask_secret, EnvReport, REQUIRED_ENV_VARS};
pub use connections::{
    Connections, KeyValueConnection, AIRTABLE_APP_ID, NOTION_APP_ID, SLACK_APP_ID,
};
pub use error::ToolError;
pub use messaging::{AgentMessage, MessageContent, MessageMetadata, MessageRole, ToolInvocation};
pub use tools::{
    parse_args, Tool, ToolBox, ToolContext, ToolDescriptor, ToolParameterSchema, ToolPermission,
    ToolRegistry, ToolResult, ToolSchema, ToolStatus,
};
