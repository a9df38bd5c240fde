//! Slack `chat.postMessage` with a typed Block Kit subset.

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use reqwest::Method;
use serde::{Deserialize, Serialize};

pub const SLACK_API_URL: &str = "https://slack.com/api";

pub struct SlackClient {
    api: ApiClient,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, api_url: Option<&str>) -> ClientResult<Self> {
        Ok(Self {
            api: ApiClient::builder(api_url.unwrap_or(SLACK_API_URL), token).build()?,
        })
    }

    /// Post a message. Slack reports most failures as HTTP 200 with
    /// `ok: false`; those become [`ClientError::Slack`] carrying the error code.
    pub async fn post_message(&self, message: &PostMessage) -> ClientResult<PostedMessage> {
        tracing::info!(channel = %message.channel, blocks = message.blocks.len(), "posting Slack message");
        let request = self
            .api
            .request(Method::POST, &["chat.postMessage"])?
            .json(message);
        let response: SlackResponse = self.api.send(request).await?;

        if !response.ok {
            let code = response.error.unwrap_or_else(|| "unknown_error".to_string());
            tracing::warn!(channel = %message.channel, error = %code, "Slack rejected message");
            return Err(ClientError::Slack(code));
        }

        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| message.channel.clone()),
            ts: response.ts.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostMessage {
    pub channel: String,
    /// Fallback text for notifications and clients without Block Kit
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockElement {
    Button {
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
        value: String,
        action_id: String,
    },
}

impl BlockElement {
    pub fn button(
        label: impl Into<String>,
        style: Option<ButtonStyle>,
        value: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        BlockElement::Button {
            text: TextObject::plain(label),
            style,
            value: value.into(),
            action_id: action_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
    Actions { elements: Vec<BlockElement> },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: TextObject::plain(text),
        }
    }

    pub fn section(markdown: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::mrkdwn(markdown),
        }
    }

    pub fn context(markdown: impl Into<String>) -> Self {
        Block::Context {
            elements: vec![TextObject::mrkdwn(markdown)],
        }
    }

    pub fn actions(elements: Vec<BlockElement>) -> Self {
        Block::Actions { elements }
    }
}
