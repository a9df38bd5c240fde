use chrono::NaiveDate;
use logistics_core::{
    Connections, KeyValueConnection, ToolContext, ToolError, ToolInvocation, ToolStatus,
    SLACK_APP_ID,
};
use logistics_tools::comms::briefing::{ApprovalOutput, BriefingOutput};
use logistics_tools::comms::procurement::OrderOutput;
use logistics_tools::workshop_registry;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slack_context(server: &MockServer, default_channel: Option<&str>) -> ToolContext {
    let mut slack = KeyValueConnection::new(SLACK_APP_ID)
        .with("token", "xoxb-workshop")
        .with("api_url", server.uri());
    if let Some(channel) = default_channel {
        slack = slack.with("channel_id", channel);
    }
    ToolContext::new(Arc::new(Connections::new().with(slack))).with_now(
        NaiveDate::from_ymd_opt(2025, 12, 9)
            .unwrap()
            .and_hms_opt(7, 45, 0)
            .unwrap(),
    )
}

async fn invoke(ctx: ToolContext, tool: &str, args: Value) -> anyhow::Result<Value> {
    let result = workshop_registry()
        .invoke(ToolInvocation::new(tool, args), ctx)
        .await?;
    Ok(result.as_json().cloned().unwrap_or(Value::Null))
}

#[tokio::test]
async fn briefing_posts_blocks_to_default_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(header("Authorization", "Bearer xoxb-workshop"))
        .and(body_partial_json(json!({
            "channel": "C-PROD",
            "text": "Scene 12 gear is reserved.",
            "blocks": [
                { "type": "header", "text": { "type": "plain_text", "text": "Production Update" } },
                { "type": "section", "text": { "type": "mrkdwn", "text": "Scene 12 gear is reserved." } },
                { "type": "context", "elements": [
                    { "type": "mrkdwn", "text": "Posted by Production Assistant | 2025-12-09 07:45" }
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "channel": "C-PROD", "ts": "1765266300.000200"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, Some("C-PROD")),
        "post_briefing",
        json!({ "message": "Scene 12 gear is reserved." }),
    )
    .await
    .unwrap();
    let output: BriefingOutput = serde_json::from_value(value).unwrap();

    assert!(output.posted);
    assert_eq!(output.channel.as_deref(), Some("C-PROD"));
    assert_eq!(output.message_ts.as_deref(), Some("1765266300.000200"));
    assert_eq!(output.status, ToolStatus::Success);
}

#[tokio::test]
async fn briefing_prefers_explicit_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "channel": "C-OTHER" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "channel": "C-OTHER", "ts": "1.2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, Some("C-PROD")),
        "post_briefing",
        json!({ "message": "hi", "channel_id": "C-OTHER" }),
    )
    .await
    .unwrap();
    assert_eq!(value["channel"], "C-OTHER");
}

#[tokio::test]
async fn briefing_without_channel_never_calls_slack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, None),
        "post_briefing",
        json!({ "message": "hi" }),
    )
    .await
    .unwrap();
    let output: BriefingOutput = serde_json::from_value(value).unwrap();
    assert!(!output.posted);
    assert_eq!(output.status, ToolStatus::Error);
    assert!(output.error.unwrap().contains("channel"));
}

#[tokio::test]
async fn briefing_surfaces_slack_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
        )
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, Some("C-GONE")),
        "post_briefing",
        json!({ "message": "hi" }),
    )
    .await
    .unwrap();
    let output: BriefingOutput = serde_json::from_value(value).unwrap();
    assert!(!output.posted);
    assert_eq!(output.message_ts, None);
    assert_eq!(output.error.as_deref(), Some("channel_not_found"));
}

#[tokio::test]
async fn briefing_requires_message() {
    let server = MockServer::start().await;
    let err = invoke(
        slack_context(&server, Some("C-PROD")),
        "post_briefing",
        json!({ "message": " " }),
    )
    .await
    .unwrap_err();
    assert!(err.downcast_ref::<ToolError>().unwrap().is_invalid_arguments());
}

#[tokio::test]
async fn approval_request_sends_buttons_and_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(body_partial_json(json!({
            "channel": "C-PROD",
            "text": "Approval needed: Steadicam rental ($240.00)"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "channel": "C-PROD", "ts": "1765266400.000300"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, Some("C-PROD")),
        "send_approval_request",
        json!({ "item_description": "Steadicam rental", "total_cost": 240, "scene_number": "Scene 14" }),
    )
    .await
    .unwrap();
    let output: ApprovalOutput = serde_json::from_value(value).unwrap();
    assert!(output.sent);
    assert_eq!(output.item_description, "Steadicam rental");
    assert_eq!(output.total_cost, 240.0);
    assert_eq!(output.message_ts.as_deref(), Some("1765266400.000300"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["text"]["text"], "Approval Required");
    assert_eq!(
        blocks[1]["text"]["text"],
        "*Item:* Steadicam rental\n*Total Cost:* $240.00\n*Scene:* Scene 14\n*Requested by:* Production Assistant"
    );
    assert_eq!(blocks[2]["elements"][0]["value"], "approve_Steadicam rental");
    assert_eq!(blocks[2]["elements"][1]["value"], "deny_Steadicam rental");
}

#[tokio::test]
async fn approval_request_keeps_item_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false, "error": "invalid_auth"
        })))
        .mount(&server)
        .await;

    let value = invoke(
        slack_context(&server, Some("C-PROD")),
        "send_approval_request",
        json!({ "item_description": "Dolly", "total_cost": 150.5 }),
    )
    .await
    .unwrap();
    let output: ApprovalOutput = serde_json::from_value(value).unwrap();
    assert!(!output.sent);
    assert_eq!(output.status, ToolStatus::Error);
    assert_eq!(output.item_description, "Dolly");
    assert_eq!(output.total_cost, 150.5);
    assert_eq!(output.error.as_deref(), Some("invalid_auth"));
}

#[tokio::test]
async fn approval_request_rejects_negative_cost() {
    let server = MockServer::start().await;
    let err = invoke(
        slack_context(&server, Some("C-PROD")),
        "send_approval_request",
        json!({ "item_description": "Dolly", "total_cost": -1 }),
    )
    .await
    .unwrap_err();
    assert!(err.downcast_ref::<ToolError>().unwrap().is_invalid_arguments());
}

#[tokio::test]
async fn slack_tools_need_a_connection() {
    let ctx = ToolContext::new(Arc::new(Connections::new()));
    let err = invoke(ctx, "post_briefing", json!({ "message": "hi" }))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::MissingConnection(_))
    ));
}

#[tokio::test]
async fn order_is_dated_from_context() {
    let server = MockServer::start().await;
    let value = invoke(
        slack_context(&server, None),
        "place_order",
        json!({ "item_name": "Sandbags", "quantity": 10, "unit_cost": 8.0, "scene_number": "Scene 3" }),
    )
    .await
    .unwrap();
    let output: OrderOutput = serde_json::from_value(value).unwrap();

    assert!(output.order_placed);
    assert!(output.order_id.unwrap().starts_with("PO-20251209-"));
    assert_eq!(output.total_cost, 80.0);
    assert_eq!(output.estimated_delivery.as_deref(), Some("2025-12-11"));
    assert_eq!(output.vendor, "Production Supply Co.");
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let server = MockServer::start().await;
    let err = invoke(slack_context(&server, None), "cancel_order", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::UnknownTool(name)) if name == "cancel_order"
    ));
}
