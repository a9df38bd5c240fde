//! Shared HTTP plumbing
//!
//! [`ApiClient`] wraps a `reqwest::Client` with a base URL, bearer token and
//! fixed headers. The service clients build requests through it and decode
//! responses with [`ApiClient::send`], which maps non-success statuses to
//! [`ClientError::Api`] using whatever error message the service returned.

use crate::error::{ClientError, ClientResult};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("production-logistics-tools/", env!("CARGO_PKG_VERSION"));

pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
    token: String,
    headers: HashMap<String, String>,
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::config(format!("cannot extend URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start an authenticated request to `segments` under the base URL.
    pub fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "building request");

        let mut request = self.client.request(method, url).bearer_auth(&self.token);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        Ok(request)
    }

    /// Send a request and decode a JSON body, mapping error statuses.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            tracing::debug!(status = status.as_u16(), %body, "request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull a human-readable message out of the error bodies Notion
/// (`{"message"}`), Airtable (`{"error": {"message"}}` or `{"error": "CODE"}`)
/// and Slack (`{"error": "code"}`) return.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let text = value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| match value.get("error")? {
            Value::String(code) => Some(code.as_str()),
            Value::Object(obj) => obj
                .get("message")
                .or_else(|| obj.get("type"))
                .and_then(Value::as_str),
            _ => None,
        })?;
    Some(text.to_string())
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct ApiClientBuilder {
    base_url: String,
    token: String,
    headers: HashMap<String, String>,
    timeout_secs: u64,
}

impl ApiClientBuilder {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            headers: HashMap::new(),
            timeout_secs: 30,
        }
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout in seconds (default: 30)
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> ClientResult<ApiClient> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::config(format!("invalid base URL {}: {e}", self.base_url)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        Ok(ApiClient {
            base_url,
            client,
            token: self.token,
            headers: self.headers,
        })
    }
}
