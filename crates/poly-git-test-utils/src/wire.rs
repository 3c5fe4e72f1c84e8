//! Wire helpers for framed JSON-RPC streams.

use poly_git_core::FrameDecoder;
use serde_json::{Value, json};

/// Frame a body exactly as a client would send it.
pub fn frame(body: &str) -> Vec<u8> {
    let mut bytes = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

/// Framed JSON-RPC request.
pub fn request(id: Value, method: &str, params: Value) -> Vec<u8> {
    frame(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string())
}

/// Framed JSON-RPC notification (no `id` member).
pub fn notification(method: &str) -> Vec<u8> {
    frame(&json!({"jsonrpc": "2.0", "method": method}).to_string())
}

/// Split a complete output stream into parsed messages.
///
/// Panics if trailing bytes do not form a complete frame.
pub fn decode_all(bytes: &[u8]) -> Vec<Value> {
    let mut decoder = FrameDecoder::new();
    decoder.extend(bytes);
    let mut messages = Vec::new();
    while let Some(body) = decoder.finish().expect("output stream is not cleanly framed") {
        messages.push(serde_json::from_slice(&body).expect("frame body is not JSON"));
    }
    messages
}
