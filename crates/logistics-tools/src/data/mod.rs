//! Notion and Airtable tools
//!
//! Scene scheduling lives in a Notion data source; equipment inventory and
//! reservations live in the Airtable `Assets` and `Allocations` tables.

pub mod inventory;
pub mod reservation;
pub mod schedule;

pub use inventory::{CheckAvailabilityTool, SearchInventoryTool};
pub use reservation::CreateReservationTool;
pub use schedule::GetScheduleTool;

use chrono::NaiveDate;
use logistics_clients::{formula, AirtableClient, ClientResult, NotionClient, Record};
use logistics_core::{ToolBox, ToolContext, ToolError, AIRTABLE_APP_ID, NOTION_APP_ID};
use std::sync::Arc;

pub const ASSETS_TABLE: &str = "Assets";
pub const ALLOCATIONS_TABLE: &str = "Allocations";

pub(crate) const ASSET_NAME: &str = "Asset Name";
pub(crate) const TOTAL_QUANTITY: &str = "Total Quantity";
pub(crate) const DAILY_RATE: &str = "Daily Rate";

/// Create the four data tools
pub fn create_data_tools() -> Vec<ToolBox> {
    vec![
        Arc::new(GetScheduleTool),
        Arc::new(SearchInventoryTool),
        Arc::new(CheckAvailabilityTool),
        Arc::new(CreateReservationTool),
    ]
}

pub(crate) fn airtable_client(ctx: &ToolContext) -> anyhow::Result<AirtableClient> {
    let conn = ctx.connections.key_value(AIRTABLE_APP_ID)?;
    Ok(AirtableClient::new(
        conn.require("token")?,
        conn.require("base_id")?,
        conn.get("api_url"),
    )?)
}

pub(crate) fn notion_client(ctx: &ToolContext) -> anyhow::Result<NotionClient> {
    let conn = ctx.connections.key_value(NOTION_APP_ID)?;
    Ok(NotionClient::new(conn.require("token")?, conn.get("api_url"))?)
}

/// Exact-name lookup in the `Assets` table
pub(crate) async fn find_asset(client: &AirtableClient, name: &str) -> ClientResult<Option<Record>> {
    client
        .table(ASSETS_TABLE)
        .first(formula::field_equals(ASSET_NAME, name))
        .await
}

pub(crate) fn asset_not_found(name: &str) -> String {
    format!("Asset '{name}' not found")
}

/// Accept only canonical `YYYY-MM-DD`; the value is interpolated into formulas
/// and compared against stored dates as text.
pub(crate) fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, ToolError> {
    let invalid =
        || ToolError::invalid(format!("{field} must be a date in YYYY-MM-DD format, got '{value}'"));
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    if date.format("%Y-%m-%d").to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

pub(crate) fn ensure_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ToolError> {
    if value < min || value > max {
        return Err(ToolError::invalid(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_only() {
        assert!(parse_iso_date("shoot_date", "2025-12-10").is_ok());
        assert!(parse_iso_date("shoot_date", "2025-02-30").is_err());
        let err = parse_iso_date("shoot_date", "2025-12-10' OR '1'='1").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn non_canonical_dates_are_rejected() {
        for value in ["2025-12-9", " 2025-12-10", "+2025-12-10", "2025-12-10 "] {
            assert!(
                parse_iso_date("shoot_date", value).is_err(),
                "accepted {value:?}"
            );
        }
        assert_eq!(
            parse_iso_date("shoot_date", "2025-01-09").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()
        );
    }

    #[test]
    fn text_is_trimmed_and_required() {
        assert_eq!(require_text("query", "  Canon ").unwrap(), "Canon");
        assert!(require_text("query", "   ").is_err());
    }

    #[test]
    fn range_is_inclusive() {
        assert!(ensure_range("days_ahead", 1, 1, 30).is_ok());
        assert!(ensure_range("days_ahead", 30, 1, 30).is_ok());
        assert!(ensure_range("days_ahead", 0, 1, 30).is_err());
        assert!(ensure_range("days_ahead", 31, 1, 30).is_err());
    }
}
