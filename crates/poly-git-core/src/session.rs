//! MCP session handler
//!
//! Maps one decoded message to at most one response. The handler performs
//! no I/O of its own; reading and writing frames is the transport's job.
//!
//! Method table:
//!
//! | method                                    | response                         |
//! |-------------------------------------------|----------------------------------|
//! | `initialize`                              | fixed server info + capabilities |
//! | `initialized`, `notifications/initialized`| none                             |
//! | `tools/list`                              | aggregated catalog               |
//! | `tools/call`                              | routed tool outcome              |
//! | anything else                             | `-32601 Method not found`        |

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value, json};

use crate::adapter::ToolResult;
use crate::protocol::{
    CallToolResult, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeResult,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::router::Router;
use crate::Result;

/// Stateless request/response handler on top of a [`Router`].
///
/// The only state kept is whether `initialize` has been seen, and it is
/// informational: requests are served either way.
#[derive(Debug)]
pub struct Session {
    router: Router,
    server_info: ServerInfo,
    initialized: AtomicBool,
}

impl Session {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            server_info: ServerInfo::default(),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn with_server_info(mut self, server_info: ServerInfo) -> Self {
        self.server_info = server_info;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Whether an `initialize` request has been handled.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Decode a frame body into a JSON value.
    ///
    /// Invalid JSON is answered with a parse error addressed to `null`.
    pub fn parse_message(body: &[u8]) -> std::result::Result<Value, JsonRpcResponse> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(error = %e, "Frame body is not valid JSON");
            JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
        })
    }

    /// Handle a raw frame body.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        match Self::parse_message(body) {
            Ok(message) => self.handle_value(message).await,
            Err(response) => Some(response),
        }
    }

    /// Handle a decoded message.
    pub async fn handle_value(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Message is not a JSON-RPC request");
                id.map(|id| {
                    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e))
                })
            }
        }
    }

    /// Handle a request; notifications never produce a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, id = ?request.id, "Handling request");

        let JsonRpcRequest {
            id, method, params, ..
        } = request;
        let reply_to = id.clone().unwrap_or(Value::Null);

        let response = match self.dispatch_method(&method, reply_to.clone(), params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(method = %method, error = %e, "Request handler failed");
                Some(JsonRpcResponse::error(
                    reply_to,
                    INTERNAL_ERROR,
                    format!("Internal error: {}", e),
                ))
            }
        };

        if id.is_none() {
            if response.is_some() {
                tracing::debug!(method = %method, "Dropping response to notification");
            }
            return None;
        }
        response
    }

    async fn dispatch_method(
        &self,
        method: &str,
        id: Value,
        params: Value,
    ) -> Result<Option<JsonRpcResponse>> {
        let response = match method {
            "initialize" => self.handle_initialize(id)?,
            "initialized" | "notifications/initialized" => return Ok(None),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, params).await?,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        };
        Ok(Some(response))
    }

    fn handle_initialize(&self, id: Value) -> Result<JsonRpcResponse> {
        self.initialized.store(true, Ordering::SeqCst);

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: self.server_info.clone(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .router
            .registry()
            .tools()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        if !self.is_initialized() {
            tracing::debug!(tool = %params.name, "tools/call before initialize");
        }

        let arguments = match params.arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let outcome = self.router.dispatch(&params.name, arguments).await;
        Ok(JsonRpcResponse::success(
            id,
            serde_json::to_value(wrap_outcome(outcome))?,
        ))
    }
}

/// Tool failures stay inside `result`, flagged with `isError`.
fn wrap_outcome(outcome: ToolResult) -> CallToolResult {
    match outcome {
        Ok(text) => CallToolResult::text(text),
        Err(message) => CallToolResult::error(message),
    }
}
