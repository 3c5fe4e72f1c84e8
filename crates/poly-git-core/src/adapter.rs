//! Adapter contract
//!
//! Every forge backend exposes a namespace of tools behind a string
//! prefix and a single async entry point. The core depends on nothing
//! else about an adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Two-armed outcome of a tool invocation.
///
/// `Err` carries a human-readable message. It is reported to the client
/// as a successful RPC whose payload is flagged `isError`, never as a
/// JSON-RPC error.
pub type ToolResult = std::result::Result<String, String>;

/// Tool definition as listed by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Capability provider for one forge.
///
/// Implementations own every tool name starting with [`prefix`](Self::prefix)
/// and must convert their own failures into the `Err` arm of [`ToolResult`].
#[async_trait]
pub trait ForgeAdapter: Send + Sync {
    /// Namespace prefix, e.g. `gh_`.
    fn prefix(&self) -> &str;

    /// Display name used in logs and diagnostics.
    fn label(&self) -> &str;

    /// Tools exposed by this adapter, in listing order.
    fn tools(&self) -> Vec<ToolDescriptor>;

    /// Run a tool. `name` is passed exactly as the client sent it.
    async fn invoke(&self, name: &str, args: Value) -> ToolResult;
}
