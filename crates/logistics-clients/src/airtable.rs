//! Airtable record listing, creation and deletion.

use crate::error::ClientResult;
use crate::http::ApiClient;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

pub struct AirtableClient {
    api: ApiClient,
    base_id: String,
}

impl AirtableClient {
    pub fn new(
        token: impl Into<String>,
        base_id: impl Into<String>,
        api_url: Option<&str>,
    ) -> ClientResult<Self> {
        Ok(Self {
            api: ApiClient::builder(api_url.unwrap_or(AIRTABLE_API_URL), token).build()?,
            base_id: base_id.into(),
        })
    }

    /// Handle to one table of the base
    pub fn table<'a>(&'a self, name: &'a str) -> Table<'a> {
        Table { client: self, name }
    }
}

pub struct Table<'a> {
    client: &'a AirtableClient,
    name: &'a str,
}

impl Table<'_> {
    /// One request's worth of records; the `offset` cursor is not followed.
    pub async fn list(&self, params: &ListRecords) -> ClientResult<Vec<Record>> {
        tracing::info!(
            table = %self.name,
            formula = ?params.filter_by_formula,
            "listing Airtable records"
        );
        let request = self
            .client
            .api
            .request(Method::GET, &[self.client.base_id.as_str(), self.name])?
            .query(&params.to_query());
        let page: RecordPage = self.client.api.send(request).await?;
        if page.offset.is_some() {
            tracing::debug!(table = %self.name, "more records available beyond first page");
        }
        Ok(page.records)
    }

    /// First record matching `formula`, if any
    pub async fn first(&self, formula: impl Into<String>) -> ClientResult<Option<Record>> {
        let params = ListRecords::new().formula(formula).max_records(1);
        Ok(self.list(&params).await?.into_iter().next())
    }

    pub async fn create(&self, fields: Value) -> ClientResult<Record> {
        tracing::info!(table = %self.name, "creating Airtable record");
        let request = self
            .client
            .api
            .request(Method::POST, &[self.client.base_id.as_str(), self.name])?
            .json(&json!({ "fields": fields }));
        self.client.api.send(request).await
    }

    pub async fn delete(&self, record_id: &str) -> ClientResult<DeletedRecord> {
        tracing::info!(table = %self.name, record = %record_id, "deleting Airtable record");
        let request = self.client.api.request(
            Method::DELETE,
            &[self.client.base_id.as_str(), self.name, record_id],
        )?;
        self.client.api.send(request).await
    }
}

/// Query parameters for listing records
#[derive(Debug, Clone, Default)]
pub struct ListRecords {
    pub filter_by_formula: Option<String>,
    pub max_records: Option<u32>,
    /// Field names sorted ascending, in priority order
    pub sort: Vec<String>,
}

impl ListRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    pub fn max_records(mut self, max: u32) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort.push(field.into());
        self
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(formula) = &self.filter_by_formula {
            query.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(max) = self.max_records {
            query.push(("maxRecords".to_string(), max.to_string()));
        }
        for (i, field) in self.sort.iter().enumerate() {
            query.push((format!("sort[{i}][field]"), field.clone()));
            query.push((format!("sort[{i}][direction]"), "asc".to_string()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl Record {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Integer field; fractional numbers are truncated.
    pub fn i64_field(&self, name: &str) -> Option<i64> {
        let value = self.fields.get(name)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
    }

    pub fn f64_field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeletedRecord {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}
