//! [`ScriptedAdapter`] for routing and session scenarios.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use poly_git_core::{ForgeAdapter, ToolDescriptor, ToolResult};
use serde_json::{Value, json};

/// An adapter whose tools return pre-programmed outcomes.
///
/// Every invocation is recorded so tests can assert on what was forwarded.
///
/// ```rust
/// use poly_git_test_utils::ScriptedAdapter;
///
/// let adapter = ScriptedAdapter::new("gh_", "GitHub")
///     .with_ok("gh_hello", "hello")
///     .with_err("gh_boom", "boom");
/// ```
pub struct ScriptedAdapter {
    prefix: String,
    label: String,
    tools: Vec<ToolDescriptor>,
    outcomes: HashMap<String, ToolResult>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedAdapter {
    pub fn new(prefix: &str, label: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            label: label.to_string(),
            tools: Vec::new(),
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// List a tool without scripting an outcome for it.
    pub fn with_tool(mut self, name: &str) -> Self {
        self.tools.push(ToolDescriptor::new(
            name,
            format!("Scripted tool {}", name),
            json!({"type": "object", "properties": {}}),
        ));
        self
    }

    /// List a tool that succeeds with `text`.
    pub fn with_ok(mut self, name: &str, text: &str) -> Self {
        self.outcomes.insert(name.to_string(), Ok(text.to_string()));
        self.with_tool(name)
    }

    /// List a tool that fails with `message`.
    pub fn with_err(mut self, name: &str, message: &str) -> Self {
        self.outcomes
            .insert(name.to_string(), Err(message.to_string()));
        self.with_tool(name)
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForgeAdapter for ScriptedAdapter {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.clone()
    }

    async fn invoke(&self, name: &str, args: Value) -> ToolResult {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args));
        self.outcomes
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(format!("no script for {}", name)))
    }
}
