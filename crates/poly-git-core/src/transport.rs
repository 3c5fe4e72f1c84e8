//! Read-dispatch-write loop
//!
//! One frame is read, fully handled (including any wait on an adapter) and
//! answered before the next read. Failures while handling a message are
//! contained to that message; only stream-level errors end the loop.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};

use crate::Result;
use crate::framing::{FrameReader, FrameWriter};
use crate::protocol::{INTERNAL_ERROR, JsonRpcResponse};
use crate::session::Session;

/// Frame reader/writer pair serving a [`Session`]
pub struct Transport<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl Transport<Stdin, Stdout> {
    /// Standard input is the only request source, standard output the only sink.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
        }
    }

    /// Serve until the input stream ends.
    ///
    /// Returns `Ok(())` on a clean end of stream. Framing and I/O errors on
    /// the stream itself are returned to the caller.
    pub async fn serve(mut self, session: Arc<Session>) -> Result<()> {
        tracing::info!("MCP transport ready");

        while let Some(body) = self.reader.read_frame().await? {
            tracing::debug!(bytes = body.len(), "Received frame");

            if let Some(response) = handle_contained(&session, body).await {
                self.writer.write_message(&response).await?;
            }
        }

        tracing::info!("Input stream closed, shutting down");
        Ok(())
    }
}

/// Handle one frame, turning a panic in the handler into a logged failure.
async fn handle_contained(session: &Arc<Session>, body: Vec<u8>) -> Option<JsonRpcResponse> {
    let message = match Session::parse_message(&body) {
        Ok(message) => message,
        Err(response) => return Some(response),
    };
    let id = message.get("id").cloned();

    let session = Arc::clone(session);
    match tokio::spawn(async move { session.handle_value(message).await }).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, id = ?id, "Message handler failed");
            id.map(|id: Value| {
                JsonRpcResponse::error(id, INTERNAL_ERROR, "Internal error: request handler failed")
            })
        }
    }
}

/// Serve a session over the process's standard streams.
pub async fn serve_stdio(session: Arc<Session>) -> Result<()> {
    Transport::stdio().serve(session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ForgeAdapter, ToolDescriptor, ToolResult};
    use crate::framing::{FrameDecoder, encode_frame};
    use crate::registry::AdapterRegistry;
    use crate::router::Router;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::io::AsyncReadExt;

    struct Fragile;

    #[async_trait]
    impl ForgeAdapter for Fragile {
        fn prefix(&self) -> &str {
            "fr_"
        }

        fn label(&self) -> &str {
            "Fragile"
        }

        fn tools(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }

        async fn invoke(&self, name: &str, _args: Value) -> ToolResult {
            if name == "fr_panic" {
                panic!("adapter bug");
            }
            Ok("fine".to_string())
        }
    }

    async fn run(input: Vec<u8>) -> (Result<()>, Vec<Value>) {
        let registry = AdapterRegistry::builder().register(Fragile).build();
        let session = Arc::new(Session::new(Router::new(Arc::new(registry))));

        let (writer, mut client) = tokio::io::duplex(64 * 1024);
        let result = Transport::new(&input[..], writer).serve(session).await;

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&output);
        let mut messages = Vec::new();
        while let Some(body) = decoder.next_frame() {
            messages.push(serde_json::from_slice(&body).unwrap());
        }
        (result, messages)
    }

    fn call(id: i64, tool: &str) -> Vec<u8> {
        encode_frame(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": tool}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_panicking_adapter_does_not_stop_loop() {
        let mut input = call(1, "fr_panic");
        input.extend(call(2, "fr_ok"));

        let (result, messages) = run(input).await;
        assert!(result.is_ok());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["id"], 1);
        assert_eq!(messages[0]["error"]["code"], INTERNAL_ERROR);
        assert_eq!(messages[1]["result"]["content"][0]["text"], "fine");
    }

    #[tokio::test]
    async fn test_notification_produces_no_output() {
        let input = encode_frame(&json!({"jsonrpc": "2.0", "method": "initialized"})).unwrap();
        let (result, messages) = run(input).await;
        assert!(result.is_ok());
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_framing_error_ends_loop_after_complete_frames() {
        let mut input = call(1, "fr_ok");
        input.extend(b"Content-Length: 99\r\n\r\n{");

        let (result, messages) = run(input).await;
        assert!(matches!(result, Err(crate::Error::Framing { .. })));
        assert_eq!(messages.len(), 1);
    }
}
