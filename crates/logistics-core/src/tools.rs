//! Tool system shared by every workshop tool
//!
//! This module provides:
//! - JSON Schema descriptions of tool parameters for the orchestrator
//! - The `Tool` trait with permission and credential metadata
//! - A per-invocation `ToolContext` carrying connections and the clock
//! - A registry that dispatches `ToolInvocation`s by name

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::connections::Connections;
use crate::error::ToolError;
use crate::messaging::{AgentMessage, MessageContent, ToolInvocation};

/// JSON Schema definition for tool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// JSON Schema type (object, string, number, integer, boolean, array)
    #[serde(rename = "type")]
    pub schema_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, ToolParameterSchema>>,

    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolParameterSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Bounds and other keywords (minimum, maximum, minLength, format)
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl ToolParameterSchema {
    fn typed(schema_type: &str, description: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            description: Some(description.into()),
            properties: None,
            required: None,
            items: None,
            default: None,
            additional: HashMap::new(),
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::typed("string", description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::typed("number", description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::typed("integer", description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::typed("boolean", description)
    }

    /// Create an object parameter with properties
    pub fn object(
        description: impl Into<String>,
        properties: HashMap<String, ToolParameterSchema>,
        required: Vec<String>,
    ) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::typed("object", description)
        }
    }

    pub fn array(description: impl Into<String>, items: ToolParameterSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", description)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Inclusive numeric bounds
    pub fn with_range(self, minimum: impl Into<Value>, maximum: impl Into<Value>) -> Self {
        self.with_keyword("minimum", minimum)
            .with_keyword("maximum", maximum)
    }

    pub fn with_minimum(self, minimum: impl Into<Value>) -> Self {
        self.with_keyword("minimum", minimum)
    }

    pub fn with_min_length(self, min_length: usize) -> Self {
        self.with_keyword("minLength", min_length)
    }

    pub fn with_format(self, format: &str) -> Self {
        self.with_keyword("format", format)
    }

    fn with_keyword(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.additional.insert(key.to_string(), value.into());
        self
    }
}

/// Complete schema definition for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique, stable name used by the orchestrator for invocation
    pub name: String,

    pub description: String,

    /// Input parameter schema (an object with properties)
    pub parameters: ToolParameterSchema,
}

impl ToolSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameterSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Whether a tool only reads from external systems or may also write to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPermission {
    ReadOnly,
    ReadWrite,
}

/// Everything an orchestrator needs to import a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(flatten)]
    pub schema: ToolSchema,
    pub permission: ToolPermission,
    /// Key-value connection app ids the tool reads credentials from
    #[serde(default)]
    pub expected_credentials: Vec<String>,
}

/// Outcome flag carried by every structured tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Context provided to tool implementations for a single invocation
#[derive(Clone)]
pub struct ToolContext {
    /// Credential sets the tool may read
    pub connections: Arc<Connections>,

    /// Tool invocation metadata (call ID for responses)
    pub tool_call_id: Option<String>,

    fixed_now: Option<NaiveDateTime>,
}

impl ToolContext {
    pub fn new(connections: Arc<Connections>) -> Self {
        Self {
            connections,
            tool_call_id: None,
            fixed_now: None,
        }
    }

    /// Set the tool call ID for response correlation
    pub fn with_call_id(mut self, call_id: Option<String>) -> Self {
        self.tool_call_id = call_id;
        self
    }

    /// Pin the clock; all date arithmetic in tools goes through [`ToolContext::now`].
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Local wall-clock time, or the pinned time when one was set.
    pub fn now(&self) -> NaiveDateTime {
        self.fixed_now
            .unwrap_or_else(|| Local::now().naive_local())
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn json_response(&self, content: Value) -> AgentMessage {
        AgentMessage::from_tool(MessageContent::Json(content), self.tool_call_id.clone())
    }
}

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub message: AgentMessage,
}

impl ToolResult {
    pub fn json(ctx: &ToolContext, content: Value) -> Self {
        Self {
            message: ctx.json_response(content),
        }
    }

    /// Serialize a structured tool output into a JSON result
    pub fn output<T: Serialize>(ctx: &ToolContext, output: &T) -> anyhow::Result<Self> {
        Ok(Self::json(ctx, serde_json::to_value(output)?))
    }

    pub fn as_json(&self) -> Option<&Value> {
        self.message.content.as_json()
    }

    /// Status flag of a structured output, if this result carries one
    pub fn status(&self) -> Option<ToolStatus> {
        self.as_json()
            .and_then(|value| value.get("status"))
            .and_then(|status| serde_json::from_value(status.clone()).ok())
    }

    /// Deserialize the JSON payload back into a typed output
    pub fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let value = self
            .as_json()
            .ok_or_else(|| anyhow::anyhow!("tool result is not JSON"))?;
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Deserialize tool arguments, mapping failures to [`ToolError::InvalidArguments`].
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    // Orchestrators send `null` for tools whose parameters are all defaulted.
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::invalid(e.to_string()))
}

/// Core trait for tool implementations
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the schema definition for this tool
    fn schema(&self) -> ToolSchema;

    fn permission(&self) -> ToolPermission {
        ToolPermission::ReadWrite
    }

    /// App ids of the key-value connections this tool reads
    fn credentials(&self) -> &'static [&'static str] {
        &[]
    }

    fn describe(&self) -> ToolDescriptor {
        ToolDescriptor {
            schema: self.schema(),
            permission: self.permission(),
            expected_credentials: self.credentials().iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Executes the tool with the given arguments and context
    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult>;
}

pub type ToolBox = Arc<dyn Tool>;

/// Tool registry for dispatching invocations by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolBox>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: ToolBox) -> &mut Self {
        let name = tool.schema().name;
        self.tools.insert(name, tool);
        self
    }

    pub fn register_all<I>(&mut self, tools: I) -> &mut Self
    where
        I: IntoIterator<Item = ToolBox>,
    {
        for tool in tools {
            self.register(tool);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolBox> {
        self.tools.get(name)
    }

    /// Descriptors of all tools, ordered by name
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<_> = self.tools.values().map(|t| t.describe()).collect();
        descriptors.sort_by(|a, b| a.schema.name.cmp(&b.schema.name));
        descriptors
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.descriptors().into_iter().map(|d| d.schema).collect()
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool with the invocation's arguments.
    pub async fn invoke(
        &self,
        invocation: ToolInvocation,
        ctx: ToolContext,
    ) -> anyhow::Result<ToolResult> {
        let tool = self
            .get(&invocation.tool_name)
            .ok_or_else(|| ToolError::UnknownTool(invocation.tool_name.clone()))?;

        let ctx = ctx.with_call_id(invocation.tool_call_id.clone());
        tracing::info!(
            tool = %invocation.tool_name,
            call_id = ?invocation.tool_call_id,
            "invoking tool"
        );

        let result = tool.execute(invocation.args, ctx).await;
        match &result {
            Ok(res) => tracing::info!(
                tool = %invocation.tool_name,
                status = ?res.status(),
                "tool finished"
            ),
            Err(err) => tracing::warn!(
                tool = %invocation.tool_name,
                error = %err,
                "tool rejected invocation"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        #[serde(default = "default_word")]
        word: String,
    }

    fn default_word() -> String {
        "cut".into()
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema::new(
                "echo",
                "Echoes a word",
                ToolParameterSchema::object(
                    "Echo parameters",
                    [(
                        "word".to_string(),
                        ToolParameterSchema::string("Word to echo").with_default("cut"),
                    )]
                    .into_iter()
                    .collect(),
                    vec![],
                ),
            )
        }

        fn permission(&self) -> ToolPermission {
            ToolPermission::ReadOnly
        }

        async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
            let args: EchoArgs = parse_args(args)?;
            Ok(ToolResult::json(
                &ctx,
                json!({ "word": args.word, "status": "success" }),
            ))
        }
    }

    fn ctx() -> ToolContext {
        ToolContext::new(Arc::new(Connections::default()))
    }

    #[tokio::test]
    async fn registry_dispatches_and_tags_call_id() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry
            .invoke(
                ToolInvocation::new("echo", json!({ "word": "action" })).with_call_id("c-7"),
                ctx(),
            )
            .await
            .unwrap();

        assert_eq!(result.status(), Some(ToolStatus::Success));
        assert_eq!(result.as_json().unwrap()["word"], "action");
        assert_eq!(result.message.tool_call_id(), Some("c-7"));
    }

    #[tokio::test]
    async fn null_args_fall_back_to_defaults() {
        let result = EchoTool.execute(Value::Null, ctx()).await.unwrap();
        assert_eq!(result.as_json().unwrap()["word"], "cut");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let registry = ToolRegistry::new();
        let err = registry
            .invoke(ToolInvocation::new("missing", json!({})), ctx())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::UnknownTool(name)) if name == "missing"
        ));
    }

    #[test]
    fn descriptor_serializes_flat() {
        let descriptor = EchoTool.describe();
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "echo");
        assert_eq!(value["permission"], "read_only");
        assert_eq!(value["parameters"]["properties"]["word"]["default"], "cut");
        assert_eq!(value["expected_credentials"], json!([]));
    }

    #[test]
    fn range_keywords_are_flattened() {
        let schema = ToolParameterSchema::integer("Days").with_range(1, 30);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["minimum"], 1);
        assert_eq!(value["maximum"], 30);
        assert_eq!(value["type"], "integer");
    }

    #[test]
    fn pinned_clock_drives_today() {
        let now = NaiveDate::from_ymd_opt(2025, 12, 9)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let ctx = ctx().with_now(now);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
        assert_eq!(ctx.now(), now);
    }

    #[test]
    fn registry_names_are_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register_all(vec![Arc::new(EchoTool) as ToolBox]);
        assert_eq!(registry.names(), vec!["echo".to_string()]);
        assert!(registry.has("echo"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
