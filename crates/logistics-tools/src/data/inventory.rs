//! Inventory search and per-date availability over the Airtable base.

use super::{
    airtable_client, asset_not_found, ensure_range, find_asset, parse_iso_date, require_text,
    ALLOCATIONS_TABLE, ASSETS_TABLE, ASSET_NAME, DAILY_RATE, TOTAL_QUANTITY,
};
use async_trait::async_trait;
use logistics_clients::{formula, AirtableClient, ClientResult, ListRecords, Record};
use logistics_core::{
    parse_args, Tool, ToolContext, ToolParameterSchema, ToolPermission, ToolResult, ToolSchema,
    ToolStatus, AIRTABLE_APP_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const QUANTITY_RESERVED: &str = "Quantity Reserved";

pub struct SearchInventoryTool;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_max_results")]
    max_results: i64,
}

const fn default_max_results() -> i64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetData {
    pub asset_name: String,
    pub total_quantity: i64,
    pub daily_rate: f64,
    pub category: String,
    pub maintenance_status: String,
    pub record_id: Option<String>,
}

impl AssetData {
    pub fn from_record(record: &Record) -> Self {
        let text = |field: &str, default: &str| {
            record
                .str_field(field)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            asset_name: text(ASSET_NAME, "Unknown"),
            total_quantity: record.i64_field(TOTAL_QUANTITY).unwrap_or(0),
            daily_rate: record.f64_field(DAILY_RATE).unwrap_or(0.0),
            category: text("Category", "N/A"),
            maintenance_status: text("Maintenance Status", "Unknown"),
            record_id: Some(record.id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    pub assets: Vec<AssetData>,
    pub query: String,
    pub items_found: usize,
    pub status: ToolStatus,
    pub error: Option<String>,
}

#[async_trait]
impl Tool for SearchInventoryTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            ToolParameterSchema::string("Search term to match against Asset Name").with_min_length(1),
        );
        properties.insert(
            "max_results".to_string(),
            ToolParameterSchema::integer("Maximum number of assets to return")
                .with_range(1, 50)
                .with_default(10),
        );

        ToolSchema::new(
            "search_inventory",
            "Searches Airtable inventory for assets by name using fuzzy matching. \
             Parameters: 'query' (string, required) - search term to match against asset names, \
             'max_results' (integer, 1-50, default=10) - limit results. Returns asset_name, \
             total_quantity, daily_rate, category. Example: query='Canon' finds all Canon equipment.",
            ToolParameterSchema::object(
                "Inventory search parameters",
                properties,
                vec!["query".to_string()],
            ),
        )
    }

    fn permission(&self) -> ToolPermission {
        ToolPermission::ReadOnly
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[AIRTABLE_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: SearchArgs = parse_args(args)?;
        let query = require_text("query", &args.query)?.to_string();
        ensure_range("max_results", args.max_results, 1, 50)?;
        let client = airtable_client(&ctx)?;

        tracing::info!(%query, max_results = args.max_results, "searching inventory");
        let params = ListRecords::new()
            .formula(formula::name_contains(ASSET_NAME, &query))
            .max_records(args.max_results as u32)
            .sort_by(ASSET_NAME);

        let output = match client.table(ASSETS_TABLE).list(&params).await {
            Ok(records) => {
                let assets: Vec<AssetData> = records.iter().map(AssetData::from_record).collect();
                SearchOutput {
                    items_found: assets.len(),
                    assets,
                    query,
                    status: ToolStatus::Success,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "inventory search failed");
                SearchOutput {
                    assets: Vec::new(),
                    query,
                    items_found: 0,
                    status: ToolStatus::Error,
                    error: Some(err.to_string()),
                }
            }
        };

        ToolResult::output(&ctx, &output)
    }
}

pub struct CheckAvailabilityTool;

#[derive(Debug, Deserialize)]
struct AvailabilityArgs {
    asset_name: String,
    shoot_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOutput {
    pub asset_name: String,
    pub shoot_date: String,
    pub total_owned: i64,
    pub reserved_on_date: i64,
    /// `total_owned - reserved_on_date`; negative when overbooked
    pub available: i64,
    pub daily_rate: f64,
    pub is_available: bool,
    pub asset_found: bool,
    pub status: ToolStatus,
    pub error: Option<String>,
}

impl AvailabilityOutput {
    fn empty(asset_name: &str, shoot_date: &str, status: ToolStatus, error: String) -> Self {
        Self {
            asset_name: asset_name.to_string(),
            shoot_date: shoot_date.to_string(),
            total_owned: 0,
            reserved_on_date: 0,
            available: 0,
            daily_rate: 0.0,
            is_available: false,
            asset_found: false,
            status,
            error: Some(error),
        }
    }
}

/// Sum of `Quantity Reserved` over allocation records
pub fn reserved_quantity(allocations: &[Record]) -> i64 {
    allocations
        .iter()
        .map(|r| r.i64_field(QUANTITY_RESERVED).unwrap_or(0))
        .sum()
}

async fn availability(
    client: &AirtableClient,
    asset_name: &str,
    shoot_date: &str,
) -> ClientResult<AvailabilityOutput> {
    let Some(asset) = find_asset(client, asset_name).await? else {
        // A missing asset is an answer, not a failure.
        return Ok(AvailabilityOutput::empty(
            asset_name,
            shoot_date,
            ToolStatus::Success,
            asset_not_found(asset_name),
        ));
    };

    let total_owned = asset.i64_field(TOTAL_QUANTITY).unwrap_or(0);
    let daily_rate = asset.f64_field(DAILY_RATE).unwrap_or(0.0);

    let allocations = client
        .table(ALLOCATIONS_TABLE)
        .list(&ListRecords::new().formula(formula::allocations_on(&asset.id, shoot_date)))
        .await?;

    let reserved = reserved_quantity(&allocations);
    let available = total_owned - reserved;
    tracing::debug!(
        asset = %asset_name,
        total_owned,
        reserved,
        allocations = allocations.len(),
        "computed availability"
    );

    Ok(AvailabilityOutput {
        asset_name: asset_name.to_string(),
        shoot_date: shoot_date.to_string(),
        total_owned,
        reserved_on_date: reserved,
        available,
        daily_rate,
        is_available: available > 0,
        asset_found: true,
        status: ToolStatus::Success,
        error: None,
    })
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "asset_name".to_string(),
            ToolParameterSchema::string("Exact asset name to check"),
        );
        properties.insert(
            "shoot_date".to_string(),
            ToolParameterSchema::string("Date in ISO format (YYYY-MM-DD)").with_format("date"),
        );

        ToolSchema::new(
            "check_availability",
            "Checks real-time availability of an asset for a specific shoot date by querying \
             Airtable reservations. Parameters: 'asset_name' (string, required) - exact asset \
             name as it appears in inventory, 'shoot_date' (string, required) - date in \
             YYYY-MM-DD format. Returns: total_owned, reserved_on_date, available count, and \
             daily_rate. Example: asset_name='Canon EOS 5D Mark IV', shoot_date='2025-12-10'.",
            ToolParameterSchema::object(
                "Availability parameters",
                properties,
                vec!["asset_name".to_string(), "shoot_date".to_string()],
            ),
        )
    }

    fn permission(&self) -> ToolPermission {
        ToolPermission::ReadOnly
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[AIRTABLE_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: AvailabilityArgs = parse_args(args)?;
        let asset_name = require_text("asset_name", &args.asset_name)?;
        let shoot_date = parse_iso_date("shoot_date", &args.shoot_date)?.to_string();
        let client = airtable_client(&ctx)?;

        tracing::info!(asset = %asset_name, date = %shoot_date, "checking availability");
        let output = availability(&client, asset_name, &shoot_date)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "availability check failed");
                AvailabilityOutput::empty(
                    asset_name,
                    &shoot_date,
                    ToolStatus::Error,
                    err.to_string(),
                )
            });

        ToolResult::output(&ctx, &output)
    }
}
