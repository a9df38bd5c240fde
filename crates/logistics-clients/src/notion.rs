//! Notion data source queries and page updates.

use crate::error::ClientResult;
use crate::http::ApiClient;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
/// API version that exposes `/data_sources/{id}/query`.
pub const NOTION_VERSION: &str = "2025-09-03";

pub struct NotionClient {
    api: ApiClient,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, api_url: Option<&str>) -> ClientResult<Self> {
        let api = ApiClient::builder(api_url.unwrap_or(NOTION_API_URL), token)
            .with_header("Notion-Version", NOTION_VERSION)
            .build()?;
        Ok(Self { api })
    }

    /// Query one page of a data source. Only the first response page is read.
    pub async fn query_data_source(
        &self,
        data_source_id: &str,
        query: &DataSourceQuery,
    ) -> ClientResult<QueryResponse> {
        tracing::info!(data_source = %data_source_id, "querying Notion data source");
        let request = self
            .api
            .request(Method::POST, &["data_sources", data_source_id, "query"])?
            .json(query);
        let response: QueryResponse = self.api.send(request).await?;
        if response.has_more {
            tracing::debug!(
                returned = response.results.len(),
                "data source has more results than one page"
            );
        }
        Ok(response)
    }

    /// Patch page properties, e.g. `{"Logistics Status": {"select": {"name": "Reserved"}}}`.
    pub async fn update_page(&self, page_id: &str, properties: Value) -> ClientResult<Page> {
        tracing::info!(page = %page_id, "updating Notion page");
        let request = self
            .api
            .request(Method::PATCH, &["pages", page_id])?
            .json(&json!({ "properties": properties }));
        self.api.send(request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

/// Body of a data source query
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataSourceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl DataSourceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a date property to `start ..= end` (ISO dates).
    pub fn date_window(mut self, property: &str, start: &str, end: &str) -> Self {
        self.filter = Some(json!({
            "and": [
                { "property": property, "date": { "on_or_after": start } },
                { "property": property, "date": { "on_or_before": end } }
            ]
        }));
        self
    }

    pub fn sorted_by(mut self, property: &str, direction: SortDirection) -> Self {
        self.sorts.push(Sort {
            property: property.to_string(),
            direction,
        });
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Readers for the property value shapes Notion returns.
///
/// `rich_text` and `select_name` require the property's `type` tag to
/// match; the other readers look only at their own key.
pub mod properties {
    use serde_json::Value;

    fn is_type(prop: &Value, expected: &str) -> bool {
        prop.get("type").and_then(Value::as_str) == Some(expected)
    }

    /// Plain text of the first title fragment
    pub fn title_text(prop: Option<&Value>) -> Option<String> {
        prop?
            .get("title")?
            .as_array()?
            .first()?
            .get("plain_text")?
            .as_str()
            .map(str::to_string)
    }

    /// Concatenated plain text of every rich text fragment
    pub fn rich_text(prop: Option<&Value>) -> Option<String> {
        let prop = prop.filter(|p| is_type(p, "rich_text"))?;
        let fragments = prop.get("rich_text")?.as_array()?;
        Some(
            fragments
                .iter()
                .filter_map(|f| f.get("plain_text").and_then(Value::as_str))
                .collect(),
        )
    }

    pub fn date_start(prop: Option<&Value>) -> Option<String> {
        prop?
            .get("date")?
            .get("start")?
            .as_str()
            .map(str::to_string)
    }

    pub fn number(prop: Option<&Value>) -> Option<f64> {
        prop?.get("number")?.as_f64()
    }

    pub fn select_name(prop: Option<&Value>) -> Option<String> {
        let prop = prop.filter(|p| is_type(p, "select"))?;
        prop.get("select")?
            .get("name")?
            .as_str()
            .map(str::to_string)
    }
}
