use super::schedule::{EST_BUDGET, LOGISTICS_STATUS};
use super::{
    airtable_client, asset_not_found, find_asset, notion_client, parse_iso_date, require_text,
    ALLOCATIONS_TABLE, DAILY_RATE,
};
use async_trait::async_trait;
use logistics_clients::{AirtableClient, ClientResult, NotionClient};
use logistics_core::{
    parse_args, Tool, ToolContext, ToolError, ToolParameterSchema, ToolResult, ToolSchema,
    ToolStatus, AIRTABLE_APP_ID, NOTION_APP_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const RESERVED_STATUS: &str = "Reserved";
pub const CONFIRMED_STATUS: &str = "Confirmed";

pub struct CreateReservationTool;

#[derive(Debug, Deserialize)]
struct ReservationArgs {
    asset_name: String,
    scene_id: String,
    scene_number: String,
    shoot_date: String,
    quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationOutput {
    pub reservation_created: bool,
    pub allocation_id: Option<String>,
    pub asset_name: String,
    pub scene_number: String,
    pub shoot_date: String,
    pub quantity: i64,
    pub daily_rate: f64,
    pub total_cost: f64,
    /// False when the Notion update failed; the allocation still stands.
    pub scene_status_updated: bool,
    pub status: ToolStatus,
    pub error: Option<String>,
}

impl ReservationOutput {
    fn failed(args: &ReservationArgs, asset_name: &str, error: String) -> Self {
        Self {
            reservation_created: false,
            allocation_id: None,
            asset_name: asset_name.to_string(),
            scene_number: args.scene_number.clone(),
            shoot_date: args.shoot_date.clone(),
            quantity: args.quantity,
            daily_rate: 0.0,
            total_cost: 0.0,
            scene_status_updated: false,
            status: ToolStatus::Error,
            error: Some(error),
        }
    }
}

/// Fields for a new row in the `Allocations` table
pub fn allocation_fields(
    asset_id: &str,
    scene_number: &str,
    shoot_date: &str,
    quantity: i64,
) -> Value {
    json!({
        "Asset Link": [asset_id],
        "Scene Ref": scene_number,
        "Start Date": shoot_date,
        "Quantity Reserved": quantity,
        "Status": CONFIRMED_STATUS,
    })
}

/// Notion property patch marking a scene as reserved with its equipment cost
pub fn scene_update(total_cost: f64) -> Value {
    json!({
        LOGISTICS_STATUS: { "select": { "name": RESERVED_STATUS } },
        EST_BUDGET: { "number": total_cost },
    })
}

async fn reserve(
    airtable: &AirtableClient,
    notion: &NotionClient,
    args: &ReservationArgs,
    asset_name: &str,
) -> ClientResult<ReservationOutput> {
    let Some(asset) = find_asset(airtable, asset_name).await? else {
        return Ok(ReservationOutput::failed(
            args,
            asset_name,
            asset_not_found(asset_name),
        ));
    };

    let daily_rate = asset.f64_field(DAILY_RATE).unwrap_or(0.0);
    let total_cost = daily_rate * args.quantity as f64;

    let allocation = airtable
        .table(ALLOCATIONS_TABLE)
        .create(allocation_fields(
            &asset.id,
            &args.scene_number,
            &args.shoot_date,
            args.quantity,
        ))
        .await?;
    tracing::info!(
        allocation_id = %allocation.id,
        asset = %asset_name,
        quantity = args.quantity,
        "allocation created"
    );

    let scene_status_updated = match notion
        .update_page(&args.scene_id, scene_update(total_cost))
        .await
    {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(
                scene_id = %args.scene_id,
                error = %err,
                "could not update scene logistics status"
            );
            false
        }
    };

    Ok(ReservationOutput {
        reservation_created: true,
        allocation_id: Some(allocation.id),
        asset_name: asset_name.to_string(),
        scene_number: args.scene_number.clone(),
        shoot_date: args.shoot_date.clone(),
        quantity: args.quantity,
        daily_rate,
        total_cost,
        scene_status_updated,
        status: ToolStatus::Success,
        error: None,
    })
}

#[async_trait]
impl Tool for CreateReservationTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "asset_name".to_string(),
            ToolParameterSchema::string("Exact name of the asset to reserve"),
        );
        properties.insert(
            "scene_id".to_string(),
            ToolParameterSchema::string("Notion page ID of the scene"),
        );
        properties.insert(
            "scene_number".to_string(),
            ToolParameterSchema::string("Scene identifier, e.g. 'Scene 12'"),
        );
        properties.insert(
            "shoot_date".to_string(),
            ToolParameterSchema::string("Date in ISO format (YYYY-MM-DD)").with_format("date"),
        );
        properties.insert(
            "quantity".to_string(),
            ToolParameterSchema::integer("Number of units to reserve").with_minimum(1),
        );

        ToolSchema::new(
            "create_reservation",
            "Creates an equipment reservation in Airtable and updates the scene status in Notion. \
             Parameters: 'asset_name' (string, required) - exact asset name, 'scene_id' (string, \
             required) - Notion page ID of the scene, 'scene_number' (string, required) - scene \
             identifier like 'Scene 12', 'shoot_date' (string, required) - YYYY-MM-DD format, \
             'quantity' (integer, required, >=1) - number of units. Returns allocation_id and \
             total_cost. Also sets the scene's Logistics Status to 'Reserved' in Notion.",
            ToolParameterSchema::object(
                "Reservation parameters",
                properties,
                vec![
                    "asset_name".to_string(),
                    "scene_id".to_string(),
                    "scene_number".to_string(),
                    "shoot_date".to_string(),
                    "quantity".to_string(),
                ],
            ),
        )
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[AIRTABLE_APP_ID, NOTION_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let mut args: ReservationArgs = parse_args(args)?;
        let asset_name = require_text("asset_name", &args.asset_name)?.to_string();
        require_text("scene_id", &args.scene_id)?;
        args.shoot_date = parse_iso_date("shoot_date", &args.shoot_date)?.to_string();
        if args.quantity < 1 {
            return Err(ToolError::invalid(format!(
                "quantity must be at least 1, got {}",
                args.quantity
            ))
            .into());
        }

        let airtable = airtable_client(&ctx)?;
        let notion = notion_client(&ctx)?;

        tracing::info!(
            asset = %asset_name,
            scene = %args.scene_number,
            date = %args.shoot_date,
            quantity = args.quantity,
            "creating reservation"
        );
        let output = reserve(&airtable, &notion, &args, &asset_name)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "reservation failed");
                ReservationOutput::failed(&args, &asset_name, err.to_string())
            });

        ToolResult::output(&ctx, &output)
    }
}
