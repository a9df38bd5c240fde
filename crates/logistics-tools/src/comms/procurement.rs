//! Mock procurement tool
//!
//! Produces a purchase order without contacting any vendor.

use crate::data::require_text;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use logistics_core::{
    parse_args, Tool, ToolContext, ToolError, ToolParameterSchema, ToolResult, ToolSchema,
    ToolStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

pub const VENDOR: &str = "Production Supply Co.";
pub const DELIVERY_DAYS: u64 = 2;

/// Place order tool - returns a synthetic purchase order
pub struct PlaceOrderTool;

#[derive(Debug, Deserialize)]
struct OrderArgs {
    item_name: String,
    quantity: i64,
    unit_cost: f64,
    #[serde(default)]
    scene_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutput {
    pub order_placed: bool,
    pub order_id: Option<String>,
    pub item_name: String,
    pub quantity: i64,
    pub total_cost: f64,
    pub vendor: String,
    pub estimated_delivery: Option<String>,
    pub status: ToolStatus,
    pub error: Option<String>,
}

/// `PO-<YYYYMMDD>-<NNNN>`, where the suffix is a 4-digit bucket of the item name hash.
pub fn order_id(item_name: &str, date: NaiveDate) -> String {
    let mut hasher = DefaultHasher::new();
    item_name.hash(&mut hasher);
    format!("PO-{}-{:04}", date.format("%Y%m%d"), hasher.finish() % 10_000)
}

#[async_trait]
impl Tool for PlaceOrderTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "item_name".to_string(),
            ToolParameterSchema::string("Item to order").with_min_length(1),
        );
        properties.insert(
            "quantity".to_string(),
            ToolParameterSchema::integer("Quantity to order").with_minimum(1),
        );
        properties.insert(
            "unit_cost".to_string(),
            ToolParameterSchema::number("Cost per unit").with_minimum(0),
        );
        properties.insert(
            "scene_number".to_string(),
            ToolParameterSchema::string("Scene reference"),
        );

        ToolSchema::new(
            "place_order",
            "Places a procurement order (mock). Use this after getting approval to \
             execute the purchase. Returns an order ID and estimated delivery date.",
            ToolParameterSchema::object(
                "Order parameters",
                properties,
                vec![
                    "item_name".to_string(),
                    "quantity".to_string(),
                    "unit_cost".to_string(),
                ],
            ),
        )
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: OrderArgs = parse_args(args)?;
        let item_name = require_text("item_name", &args.item_name)?.to_string();
        if args.quantity < 1 {
            return Err(
                ToolError::invalid(format!("quantity must be at least 1, got {}", args.quantity))
                    .into(),
            );
        }
        if args.unit_cost < 0.0 {
            return Err(
                ToolError::invalid(format!("unit_cost must be >= 0, got {}", args.unit_cost))
                    .into(),
            );
        }

        let today = ctx.today();
        let total_cost = args.unit_cost * args.quantity as f64;
        let output = match today.checked_add_days(Days::new(DELIVERY_DAYS)) {
            Some(delivery) => OrderOutput {
                order_placed: true,
                order_id: Some(order_id(&item_name, today)),
                item_name,
                quantity: args.quantity,
                total_cost,
                vendor: VENDOR.to_string(),
                estimated_delivery: Some(delivery.to_string()),
                status: ToolStatus::Success,
                error: None,
            },
            None => OrderOutput {
                order_placed: false,
                order_id: None,
                item_name,
                quantity: args.quantity,
                total_cost,
                vendor: VENDOR.to_string(),
                estimated_delivery: None,
                status: ToolStatus::Error,
                error: Some("delivery date out of range".to_string()),
            },
        };

        tracing::info!(
            order_id = ?output.order_id,
            item = %output.item_name,
            scene = ?args.scene_number,
            total_cost,
            "mock order placed"
        );
        ToolResult::output(&ctx, &output)
    }
}
