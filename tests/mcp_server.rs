mod common;
use common::{ada_pair, ada_record, app_with, MockTransport};

use reservation_mcp::mcp::server::McpServer;
use reservation_mcp::services::access::AccessMode;
use reservation_mcp::services::context::Instrumentation;
use serde_json::{json, Value};
use std::sync::Arc;

fn server(transport: &Arc<MockTransport>, mode: AccessMode) -> McpServer {
    McpServer::new(app_with(transport.clone(), mode, Instrumentation::Plain))
}

async fn roundtrip(server: &McpServer, request: Value) -> Value {
    let line = server
        .handle_line(&request.to_string())
        .await
        .expect("a response");
    serde_json::from_str(&line).expect("response is json")
}

#[tokio::test]
async fn initialize_advertises_tools() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let response = roundtrip(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "reservation-mcp");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn notifications_get_no_reply() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let reply = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(reply.is_none());
    assert!(server.handle_line("   ").await.is_none());
}

#[tokio::test]
async fn ping_and_unknown_methods() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let pong = roundtrip(&server, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})).await;
    assert_eq!(pong["result"], json!({}));

    let missing = roundtrip(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}),
    )
    .await;
    assert_eq!(missing["error"]["code"], -32601);
}

#[tokio::test]
async fn tools_list_returns_the_four_reservation_tools() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let response = roundtrip(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}),
    )
    .await;

    let mut names: Vec<String> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "createReservation",
            "deleteReservation",
            "getReservation",
            "updateReservation"
        ]
    );
    let create = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .find(|tool| tool["name"] == "createReservation")
        .unwrap();
    assert!(create["inputSchema"]["required"]
        .as_array()
        .unwrap()
        .contains(&json!("nb_people")));
}

#[tokio::test]
async fn tools_call_wraps_the_envelope() {
    let transport = MockTransport::new();
    transport.reply_json(200, json!([ada_record()]));
    let server = server(&transport, AccessMode::Open);

    let response = roundtrip(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "getReservation", "arguments": ada_pair()}
        }),
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["isError"], false);
    let summary = result["content"][0]["text"].as_str().unwrap();
    assert!(summary.starts_with("Found reservation for Ada Lovelace"));
    assert_eq!(result["structuredContent"]["id"], 17);
}

#[tokio::test]
async fn failed_tool_is_an_error_result_not_a_protocol_error() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let response = roundtrip(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "updateReservation", "arguments": ada_pair()}
        }),
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["structuredContent"]["error"]["code"],
        "VALIDATION_ERROR"
    );
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let response = roundtrip(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "getReservaton", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    let message = response["error"]["message"].as_str().unwrap();
    assert!(message.contains("Unknown tool: getReservaton"));
    assert!(message.contains("getReservation"));
}

#[tokio::test]
async fn identity_mode_requires_user_claims() {
    let transport = MockTransport::new();
    transport.reply_json(200, json!([ada_record()]));
    let server = server(&transport, AccessMode::Identity);

    let anonymous = roundtrip(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "getReservation", "arguments": ada_pair()}
        }),
    )
    .await;
    assert_eq!(anonymous["error"]["code"], -32600);
    assert_eq!(transport.calls(), 0);

    let signed_in = roundtrip(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 8,
            "method": "tools/call",
            "params": {
                "name": "getReservation",
                "arguments": ada_pair(),
                "_meta": {"user": {"id": "user-1", "email": "ada@example.com"}}
            }
        }),
    )
    .await;
    assert_eq!(signed_in["result"]["isError"], false);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn malformed_lines_get_protocol_errors() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    let parse = server.handle_line("{not json").await.unwrap();
    let parse: Value = serde_json::from_str(&parse).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert!(parse["id"].is_null());

    let invalid = server.handle_line(r#"{"id": 1, "params": {}}"#).await.unwrap();
    let invalid: Value = serde_json::from_str(&invalid).unwrap();
    assert_eq!(invalid["error"]["code"], -32600);
}

#[tokio::test]
async fn open_mode_ignores_malformed_user_claims() {
    let transport = MockTransport::new();
    let server = server(&transport, AccessMode::Open);

    for (id, claims) in [(9, json!("someone")), (10, json!({"id": " "}))] {
        transport.reply_json(200, json!([ada_record()]));
        let response = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": {
                    "name": "getReservation",
                    "arguments": ada_pair(),
                    "_meta": {"user": claims}
                }
            }),
        )
        .await;
        assert!(response.get("error").is_none(), "{}", response);
        assert_eq!(response["result"]["isError"], false);
    }
    assert_eq!(transport.calls(), 2);
}
