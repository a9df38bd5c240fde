//! Key-value credential sets addressed by application id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::{
    self, AIRTABLE_BASE_VAR, AIRTABLE_KEY_VAR, AIRTABLE_URL_VAR, NOTION_DATABASE_VAR,
    NOTION_SECRET_FALLBACK_VAR, NOTION_SECRET_VAR, NOTION_URL_VAR, SLACK_CHANNEL_VAR,
    SLACK_TOKEN_VAR, SLACK_URL_VAR,
};
use crate::error::ToolError;

pub const NOTION_APP_ID: &str = "gcsc_notion_api";
pub const AIRTABLE_APP_ID: &str = "gcsc_airtable_api";
pub const SLACK_APP_ID: &str = "gcsc_slack_api";

/// One named set of credentials, e.g. `token` plus `base_id`.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyValueConnection {
    app_id: String,
    values: BTreeMap<String, String>,
}

impl KeyValueConnection {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    fn with_optional(self, key: &str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ToolError> {
        self.get(key).ok_or_else(|| ToolError::MissingConnectionKey {
            app_id: self.app_id.clone(),
            key: key.to_string(),
        })
    }
}

// Values are secrets; only the keys are printed.
impl fmt::Debug for KeyValueConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueConnection")
            .field("app_id", &self.app_id)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Connections {
    entries: HashMap<String, KeyValueConnection>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connection: KeyValueConnection) -> &mut Self {
        self.entries
            .insert(connection.app_id.clone(), connection);
        self
    }

    pub fn with(mut self, connection: KeyValueConnection) -> Self {
        self.insert(connection);
        self
    }

    pub fn key_value(&self, app_id: &str) -> Result<&KeyValueConnection, ToolError> {
        self.entries
            .get(app_id)
            .ok_or_else(|| ToolError::MissingConnection(app_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the Notion, Airtable and Slack connections from variables
    /// resolved through `lookup`. A connection is only added when at least
    /// its token is set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| config::non_empty(&lookup, name);
        let mut connections = Self::new();

        if let Some(token) = var(NOTION_SECRET_VAR).or_else(|| var(NOTION_SECRET_FALLBACK_VAR)) {
            connections.insert(
                KeyValueConnection::new(NOTION_APP_ID)
                    .with("token", token)
                    .with_optional("database_id", var(NOTION_DATABASE_VAR))
                    .with_optional("api_url", var(NOTION_URL_VAR)),
            );
        }

        if let Some(token) = var(AIRTABLE_KEY_VAR) {
            connections.insert(
                KeyValueConnection::new(AIRTABLE_APP_ID)
                    .with("token", token)
                    .with_optional("base_id", var(AIRTABLE_BASE_VAR))
                    .with_optional("api_url", var(AIRTABLE_URL_VAR)),
            );
        }

        if let Some(token) = var(SLACK_TOKEN_VAR) {
            connections.insert(
                KeyValueConnection::new(SLACK_APP_ID)
                    .with("token", token)
                    .with_optional("channel_id", var(SLACK_CHANNEL_VAR))
                    .with_optional("api_url", var(SLACK_URL_VAR)),
            );
        }

        tracing::debug!(count = connections.len(), "loaded connections from environment");
        connections
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
