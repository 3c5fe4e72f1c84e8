//! End-to-end tests of the transport loop over in-memory streams.

use std::sync::Arc;

use poly_git_core::{AdapterRegistry, Error, Router, Session, Transport};
use poly_git_test_utils::{ScriptedAdapter, decode_all, frame, notification, request};
use rstest::rstest;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn session() -> Arc<Session> {
    let registry = AdapterRegistry::builder()
        .register(ScriptedAdapter::new("gh_", "GitHub").with_ok("gh_hello", "hello"))
        .build();
    Arc::new(Session::new(Router::new(Arc::new(registry))))
}

/// Run the loop over `input` delivered in `chunk`-sized writes.
async fn serve_chunked(input: Vec<u8>, chunk: usize) -> (Result<(), Error>, Vec<Value>) {
    let (mut client_in, server_in) = tokio::io::duplex(16);
    let (server_out, mut client_out) = tokio::io::duplex(64 * 1024);

    let feeder = tokio::spawn(async move {
        for piece in input.chunks(chunk.max(1)) {
            client_in.write_all(piece).await.unwrap();
        }
        client_in.shutdown().await.unwrap();
    });

    let result = Transport::new(server_in, server_out).serve(session()).await;
    feeder.await.unwrap();

    let mut output = Vec::new();
    client_out.read_to_end(&mut output).await.unwrap();
    (result, decode_all(&output))
}

fn conversation() -> Vec<u8> {
    let mut input = request(json!(1), "initialize", json!({}));
    input.extend(notification("notifications/initialized"));
    input.extend(request(json!(2), "tools/list", json!({})));
    input.extend(request(json!(3), "tools/call", json!({"name": "gh_hello"})));
    input.extend(request(json!(4), "frobnicate", json!({})));
    input
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(64)]
#[case(100_000)]
#[tokio::test]
async fn test_conversation_any_chunking(#[case] chunk: usize) {
    let (result, messages) = serve_chunked(conversation(), chunk).await;

    assert!(result.is_ok());
    let ids: Vec<&Value> = messages.iter().map(|m| &m["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3), &json!(4)]);
    assert_eq!(messages[2]["result"]["content"][0]["text"], "hello");
    assert_eq!(messages[3]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_empty_input_is_clean_shutdown() {
    let (result, messages) = serve_chunked(Vec::new(), 1).await;
    assert!(result.is_ok());
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_invalid_json_body_is_answered_and_loop_continues() {
    let mut input = frame("{broken");
    input.extend(request(json!(5), "tools/list", json!({})));

    let (result, messages) = serve_chunked(input, 3).await;
    assert!(result.is_ok());
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["error"]["code"], -32700);
    assert_eq!(messages[0]["id"], Value::Null);
    assert_eq!(messages[1]["id"], 5);
}

#[tokio::test]
async fn test_multibyte_body_round_trip() {
    let input = request(
        json!("ü"),
        "tools/call",
        json!({"name": "gh_hello", "arguments": {"title": "Grüße ✓ 🚀"}}),
    );
    let (result, messages) = serve_chunked(input, 5).await;
    assert!(result.is_ok());
    assert_eq!(messages[0]["id"], "ü");
}

#[tokio::test]
async fn test_truncated_frame_is_framing_error() {
    let mut input = request(json!(1), "tools/list", json!({}));
    input.extend(b"Content-Length: 40\r\n\r\n{\"jsonrpc\"");

    let (result, messages) = serve_chunked(input, 11).await;
    assert!(matches!(result, Err(Error::Framing { .. })));
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_overflowing_content_length_ends_loop_with_framing_error() {
    let mut input = request(json!(1), "tools/list", json!({}));
    input.extend(format!("Content-Length: {}\r\n\r\n{{}}", usize::MAX).into_bytes());

    let (result, messages) = serve_chunked(input, 64).await;
    match result {
        Err(Error::Framing { message }) => assert!(message.contains("no valid Content-Length")),
        other => panic!("expected framing error, got {:?}", other),
    }
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], 1);
}
