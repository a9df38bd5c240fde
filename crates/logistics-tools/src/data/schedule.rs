//! Upcoming scenes from the Notion shooting schedule.

use super::{ensure_range, notion_client};
use async_trait::async_trait;
use chrono::Days;
use logistics_clients::notion::{properties, Page};
use logistics_clients::{DataSourceQuery, SortDirection};
use logistics_core::{
    parse_args, Tool, ToolContext, ToolParameterSchema, ToolPermission, ToolResult, ToolSchema,
    ToolStatus, NOTION_APP_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const SCENE_NUMBER: &str = "Scene Number";
const SHOOT_DATE: &str = "Shoot Date";
const SCRIPT_BREAKDOWN: &str = "Script Breakdown";
pub(crate) const EST_BUDGET: &str = "Est. Budget";
pub(crate) const LOGISTICS_STATUS: &str = "Logistics Status";

pub struct GetScheduleTool;

#[derive(Debug, Deserialize)]
struct ScheduleArgs {
    #[serde(default = "default_days_ahead")]
    days_ahead: i64,
}

const fn default_days_ahead() -> i64 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub scene_id: String,
    pub scene_number: String,
    pub shoot_date: String,
    /// Free text describing equipment needs
    pub script_breakdown: String,
    pub est_budget: Option<f64>,
    pub logistics_status: String,
}

impl SceneData {
    pub fn from_page(page: &Page) -> Self {
        Self {
            scene_id: page.id.clone(),
            scene_number: properties::title_text(page.property(SCENE_NUMBER))
                .unwrap_or_else(|| "N/A".to_string()),
            shoot_date: properties::date_start(page.property(SHOOT_DATE))
                .unwrap_or_else(|| "Unknown".to_string()),
            script_breakdown: properties::rich_text(page.property(SCRIPT_BREAKDOWN))
                .unwrap_or_default(),
            est_budget: properties::number(page.property(EST_BUDGET)),
            logistics_status: properties::select_name(page.property(LOGISTICS_STATUS))
                .unwrap_or_else(|| "Pending".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub scenes: Vec<SceneData>,
    pub date_range: DateRange,
    pub total_scenes: usize,
    pub status: ToolStatus,
    pub error: Option<String>,
}

#[async_trait]
impl Tool for GetScheduleTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "days_ahead".to_string(),
            ToolParameterSchema::integer("Number of days ahead to fetch (default: 2)")
                .with_range(1, 30)
                .with_default(2),
        );

        ToolSchema::new(
            "get_schedule",
            "Fetches upcoming filming scenes from Notion. Parameter: 'days_ahead' (integer, \
             1-30, default=2) - number of days to look ahead. Returns scene details including \
             scene_id, scene_number, shoot_date (YYYY-MM-DD), and script_breakdown text \
             describing equipment needs. Example: days_ahead=7 fetches scenes for next week.",
            ToolParameterSchema::object("Schedule parameters", properties, vec![]),
        )
    }

    fn permission(&self) -> ToolPermission {
        ToolPermission::ReadOnly
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[NOTION_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: ScheduleArgs = parse_args(args)?;
        ensure_range("days_ahead", args.days_ahead, 1, 30)?;

        let conn = ctx.connections.key_value(NOTION_APP_ID)?;
        let data_source_id = conn.require("database_id")?;
        let client = notion_client(&ctx)?;

        let today = ctx.today();
        let end = today + Days::new(args.days_ahead as u64);
        let date_range = DateRange {
            start: today.to_string(),
            end: end.to_string(),
        };
        tracing::info!(start = %date_range.start, end = %date_range.end, "fetching schedule");

        let query = DataSourceQuery::new()
            .date_window(SHOOT_DATE, &date_range.start, &date_range.end)
            .sorted_by(SHOOT_DATE, SortDirection::Ascending);

        let output = match client.query_data_source(data_source_id, &query).await {
            Ok(response) => {
                let scenes: Vec<SceneData> =
                    response.results.iter().map(SceneData::from_page).collect();
                ScheduleOutput {
                    total_scenes: scenes.len(),
                    scenes,
                    date_range,
                    status: ToolStatus::Success,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "schedule query failed");
                ScheduleOutput {
                    scenes: Vec::new(),
                    date_range,
                    total_scenes: 0,
                    status: ToolStatus::Error,
                    error: Some(err.to_string()),
                }
            }
        };

        ToolResult::output(&ctx, &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(properties: Value) -> Page {
        serde_json::from_value(json!({ "id": "page-12", "properties": properties })).unwrap()
    }

    #[test]
    fn extracts_all_fields() {
        let scene = SceneData::from_page(&page(json!({
            "Scene Number": { "type": "title", "title": [{ "plain_text": "Scene 12" }] },
            "Shoot Date": { "type": "date", "date": { "start": "2025-12-10", "end": null } },
            "Script Breakdown": {
                "type": "rich_text",
                "rich_text": [{ "plain_text": "Night exterior. " }, { "plain_text": "2x Canon, 1 dolly." }]
            },
            "Est. Budget": { "type": "number", "number": 590.0 },
            "Logistics Status": { "type": "select", "select": { "name": "Reserved" } }
        })));

        assert_eq!(
            scene,
            SceneData {
                scene_id: "page-12".into(),
                scene_number: "Scene 12".into(),
                shoot_date: "2025-12-10".into(),
                script_breakdown: "Night exterior. 2x Canon, 1 dolly.".into(),
                est_budget: Some(590.0),
                logistics_status: "Reserved".into(),
            }
        );
    }

    #[test]
    fn falls_back_on_missing_or_odd_shapes() {
        let scene = SceneData::from_page(&page(json!({
            "Scene Number": { "type": "title", "title": [] },
            "Script Breakdown": { "type": "title", "title": [{ "plain_text": "ignored" }] },
            "Est. Budget": { "type": "number", "number": null },
            "Logistics Status": { "type": "select", "select": null }
        })));

        assert_eq!(scene.scene_number, "N/A");
        assert_eq!(scene.shoot_date, "Unknown");
        assert_eq!(scene.script_breakdown, "");
        assert_eq!(scene.est_budget, None);
        assert_eq!(scene.logistics_status, "Pending");
    }

    #[test]
    fn schema_declares_bounds() {
        let schema = serde_json::to_value(GetScheduleTool.schema()).unwrap();
        let days = &schema["parameters"]["properties"]["days_ahead"];
        assert_eq!(days["minimum"], 1);
        assert_eq!(days["maximum"], 30);
        assert_eq!(days["default"], 2);
        assert_eq!(GetScheduleTool.permission(), ToolPermission::ReadOnly);
    }
}
