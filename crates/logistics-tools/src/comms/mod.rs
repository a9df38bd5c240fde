//! Team communication tools
//!
//! Briefings and approval requests go to Slack. Order placement is a local
//! mock that never leaves the process.

pub mod briefing;
pub mod procurement;

pub use briefing::{PostBriefingTool, SendApprovalRequestTool};
pub use procurement::PlaceOrderTool;

use chrono::NaiveDateTime;
use logistics_clients::SlackClient;
use logistics_core::{ToolBox, ToolContext, SLACK_APP_ID};
use std::sync::Arc;

/// Name shown in every message this assistant posts
pub const ASSISTANT_NAME: &str = "Production Assistant";

/// Create the three communication tools
pub fn create_communication_tools() -> Vec<ToolBox> {
    vec![
        Arc::new(PostBriefingTool),
        Arc::new(SendApprovalRequestTool),
        Arc::new(PlaceOrderTool),
    ]
}

/// A Slack client plus the default channel from the connection, if any.
pub(crate) fn slack_client(ctx: &ToolContext) -> anyhow::Result<(SlackClient, Option<String>)> {
    let conn = ctx.connections.key_value(SLACK_APP_ID)?;
    let client = SlackClient::new(conn.require("token")?, conn.get("api_url"))?;
    Ok((client, conn.get("channel_id").map(str::to_string)))
}

/// Picks the caller's channel over the configured default. Blank values count as absent.
pub(crate) fn resolve_channel(requested: Option<&str>, default: Option<String>) -> Option<String> {
    requested
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or(default)
}

pub(crate) fn timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) const NO_CHANNEL: &str =
    "No Slack channel configured: pass channel_id or set SLACK_CHANNEL_ID";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn explicit_channel_wins() {
        assert_eq!(
            resolve_channel(Some("C-OVERRIDE"), Some("C-DEFAULT".into())).as_deref(),
            Some("C-OVERRIDE")
        );
        assert_eq!(
            resolve_channel(Some("  "), Some("C-DEFAULT".into())).as_deref(),
            Some("C-DEFAULT")
        );
        assert_eq!(resolve_channel(None, None), None);
    }

    #[test]
    fn timestamp_is_minute_precision() {
        let now = NaiveDate::from_ymd_opt(2025, 12, 9)
            .unwrap()
            .and_hms_opt(7, 5, 59)
            .unwrap();
        assert_eq!(timestamp(now), "2025-12-09 07:05");
    }
}
