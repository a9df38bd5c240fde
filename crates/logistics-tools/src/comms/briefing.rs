//! Slack briefings and purchase approval requests.

use super::{resolve_channel, slack_client, timestamp, ASSISTANT_NAME, NO_CHANNEL};
use crate::data::require_text;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use logistics_clients::{Block, BlockElement, ButtonStyle, PostMessage, PostedMessage};
use logistics_core::{
    parse_args, Tool, ToolContext, ToolError, ToolParameterSchema, ToolResult, ToolSchema,
    ToolStatus, SLACK_APP_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Purchases above this amount need an approval round trip.
pub const APPROVAL_THRESHOLD: f64 = 100.0;

fn channel_property() -> ToolParameterSchema {
    ToolParameterSchema::string("Slack channel ID (optional - defaults to configured channel)")
}

/// Outcome of a single `chat.postMessage` call.
struct Delivery {
    posted: Option<PostedMessage>,
    channel: Option<String>,
    error: Option<String>,
}

impl Delivery {
    fn status(&self) -> ToolStatus {
        if self.posted.is_some() {
            ToolStatus::Success
        } else {
            ToolStatus::Error
        }
    }

    fn ts(&self) -> Option<String> {
        self.posted.as_ref().map(|p| p.ts.clone())
    }
}

async fn deliver(
    ctx: &ToolContext,
    requested_channel: Option<&str>,
    text: String,
    blocks: Vec<Block>,
) -> anyhow::Result<Delivery> {
    let (client, default_channel) = slack_client(ctx)?;
    let Some(channel) = resolve_channel(requested_channel, default_channel) else {
        tracing::warn!("no Slack channel available");
        return Ok(Delivery {
            posted: None,
            channel: None,
            error: Some(NO_CHANNEL.to_string()),
        });
    };

    let message = PostMessage {
        channel: channel.clone(),
        text,
        blocks,
    };
    Ok(match client.post_message(&message).await {
        Ok(posted) => Delivery {
            channel: Some(posted.channel.clone()),
            posted: Some(posted),
            error: None,
        },
        Err(err) => {
            tracing::warn!(%channel, error = %err, "Slack post failed");
            Delivery {
                posted: None,
                channel: None,
                error: Some(err.to_string()),
            }
        }
    })
}

pub struct PostBriefingTool;

#[derive(Debug, Deserialize)]
struct BriefingArgs {
    message: String,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingOutput {
    pub posted: bool,
    pub message_ts: Option<String>,
    pub channel: Option<String>,
    pub status: ToolStatus,
    pub error: Option<String>,
}

pub fn briefing_blocks(message: &str, now: NaiveDateTime) -> Vec<Block> {
    vec![
        Block::header("Production Update"),
        Block::section(message),
        Block::context(format!(
            "Posted by {ASSISTANT_NAME} | {}",
            timestamp(now)
        )),
    ]
}

#[async_trait]
impl Tool for PostBriefingTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "message".to_string(),
            ToolParameterSchema::string("Main briefing message to post").with_min_length(1),
        );
        properties.insert("channel_id".to_string(), channel_property());

        ToolSchema::new(
            "post_briefing",
            "Posts a briefing message to the production team Slack channel. Use this to send \
             daily updates, equipment status summaries, or any team communication. \
             Parameter: 'message' (string, required) - the briefing content to post. \
             The channel is pre-configured - do NOT ask the user for a channel.",
            ToolParameterSchema::object(
                "Briefing parameters",
                properties,
                vec!["message".to_string()],
            ),
        )
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[SLACK_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: BriefingArgs = parse_args(args)?;
        require_text("message", &args.message)?;

        tracing::info!(chars = args.message.len(), "posting briefing");
        let blocks = briefing_blocks(&args.message, ctx.now());
        let delivery = deliver(&ctx, args.channel_id.as_deref(), args.message, blocks).await?;

        let output = BriefingOutput {
            posted: delivery.posted.is_some(),
            message_ts: delivery.ts(),
            status: delivery.status(),
            channel: delivery.channel,
            error: delivery.error,
        };
        ToolResult::output(&ctx, &output)
    }
}

pub struct SendApprovalRequestTool;

#[derive(Debug, Deserialize)]
struct ApprovalArgs {
    item_description: String,
    total_cost: f64,
    #[serde(default)]
    scene_number: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalOutput {
    pub sent: bool,
    pub message_ts: Option<String>,
    pub channel: Option<String>,
    pub item_description: String,
    pub total_cost: f64,
    pub status: ToolStatus,
    pub error: Option<String>,
}

pub fn approval_blocks(
    item: &str,
    total_cost: f64,
    scene_number: Option<&str>,
    now: NaiveDateTime,
) -> Vec<Block> {
    let scene = scene_number
        .filter(|s| !s.is_empty())
        .map(|s| format!("\n*Scene:* {s}"))
        .unwrap_or_default();

    vec![
        Block::header("Approval Required"),
        Block::section(format!(
            "*Item:* {item}\n*Total Cost:* ${total_cost:.2}{scene}\n*Requested by:* {ASSISTANT_NAME}"
        )),
        Block::actions(vec![
            BlockElement::button(
                "Approve",
                Some(ButtonStyle::Primary),
                format!("approve_{item}"),
                "approve_purchase",
            ),
            BlockElement::button(
                "Deny",
                Some(ButtonStyle::Danger),
                format!("deny_{item}"),
                "deny_purchase",
            ),
        ]),
        Block::context(format!(
            "Approval threshold: ${APPROVAL_THRESHOLD:.0} | Requested at {}",
            timestamp(now)
        )),
    ]
}

#[async_trait]
impl Tool for SendApprovalRequestTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "item_description".to_string(),
            ToolParameterSchema::string("What needs approval").with_min_length(1),
        );
        properties.insert(
            "total_cost".to_string(),
            ToolParameterSchema::number("Total cost amount").with_minimum(0),
        );
        properties.insert(
            "scene_number".to_string(),
            ToolParameterSchema::string("Scene reference"),
        );
        properties.insert("channel_id".to_string(), channel_property());

        ToolSchema::new(
            "send_approval_request",
            "Sends an approval request to Slack with Approve/Deny buttons. Use this for \
             purchases over $100 that need budget approval from the team. Parameters: \
             'item_description' (string, required), 'total_cost' (number, required). \
             Optional: 'scene_number' for context. The channel is pre-configured - \
             do NOT ask the user for a channel.",
            ToolParameterSchema::object(
                "Approval request parameters",
                properties,
                vec!["item_description".to_string(), "total_cost".to_string()],
            ),
        )
    }

    fn credentials(&self) -> &'static [&'static str] {
        &[SLACK_APP_ID]
    }

    async fn execute(&self, args: Value, ctx: ToolContext) -> anyhow::Result<ToolResult> {
        let args: ApprovalArgs = parse_args(args)?;
        let item = require_text("item_description", &args.item_description)?.to_string();
        if args.total_cost < 0.0 {
            return Err(ToolError::invalid(format!(
                "total_cost must be >= 0, got {}",
                args.total_cost
            ))
            .into());
        }

        tracing::info!(item = %item, total_cost = args.total_cost, "requesting approval");
        let blocks = approval_blocks(
            &item,
            args.total_cost,
            args.scene_number.as_deref(),
            ctx.now(),
        );
        let text = format!("Approval needed: {item} (${:.2})", args.total_cost);
        let delivery = deliver(&ctx, args.channel_id.as_deref(), text, blocks).await?;

        let output = ApprovalOutput {
            sent: delivery.posted.is_some(),
            message_ts: delivery.ts(),
            status: delivery.status(),
            channel: delivery.channel,
            item_description: item,
            total_cost: args.total_cost,
            error: delivery.error,
        };
        ToolResult::output(&ctx, &output)
    }
}
