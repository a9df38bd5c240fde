//! Environment variables the workshop deployment reads, and a masked report
//! of which of them are set.

use serde::Serialize;

pub const NOTION_SECRET_VAR: &str = "NOTION_INTEGARTION_SECRET";
/// Correctly spelled alias, consulted when the legacy name is unset.
pub const NOTION_SECRET_FALLBACK_VAR: &str = "NOTION_INTEGRATION_SECRET";
pub const NOTION_DATABASE_VAR: &str = "NOTION_DATABASE_UUID";
pub const AIRTABLE_KEY_VAR: &str = "AIRTABLE_API_KEY";
pub const AIRTABLE_BASE_VAR: &str = "AIRTABLE_INVENTORY_BASE_ID";
pub const SLACK_TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
pub const SLACK_CHANNEL_VAR: &str = "SLACK_CHANNEL_ID";
pub const GOOGLE_KEY_VAR: &str = "GOOGLE_API_KEY";

pub const NOTION_URL_VAR: &str = "NOTION_API_URL";
pub const AIRTABLE_URL_VAR: &str = "AIRTABLE_API_URL";
pub const SLACK_URL_VAR: &str = "SLACK_API_URL";

pub const REQUIRED_ENV_VARS: [&str; 7] = [
    NOTION_SECRET_VAR,
    NOTION_DATABASE_VAR,
    AIRTABLE_KEY_VAR,
    AIRTABLE_BASE_VAR,
    SLACK_TOKEN_VAR,
    SLACK_CHANNEL_VAR,
    GOOGLE_KEY_VAR,
];

/// Read a variable through `lookup`, treating empty values as unset.
pub fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

/// Resolve a required variable, honouring the Notion secret alias.
fn resolve<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name).or_else(|| {
        (name == NOTION_SECRET_VAR)
            .then(|| non_empty(lookup, NOTION_SECRET_FALLBACK_VAR))
            .flatten()
    })
}

/// First eight characters followed by `...`, or `***` for short values.
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() > 8 {
        let prefix: String = value.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        "***".to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvReport {
    /// `(name, masked value)` for every required variable that is set
    pub present: Vec<(String, String)>,
    pub missing: Vec<String>,
}

impl EnvReport {
    /// Check all required variables through `lookup`.
    pub fn check<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut present = Vec::new();
        let mut missing = Vec::new();
        for name in REQUIRED_ENV_VARS {
            match resolve(&lookup, name) {
                Some(value) => present.push((name.to_string(), mask_secret(&value))),
                None => missing.push(name.to_string()),
            }
        }
        Self { present, missing }
    }

    pub fn from_process_env() -> Self {
        Self::check(|name| std::env::var(name).ok())
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
