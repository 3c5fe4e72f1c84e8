//! Prefix-based tool routing

use std::sync::Arc;

use serde_json::Value;

use crate::adapter::ToolResult;
use crate::registry::{AdapterRegistry, RegisteredAdapter};

/// Routes tool calls to the adapter owning the tool's prefix.
///
/// Prefixes are tried in registration order and the first match wins.
/// The adapter's outcome is returned untouched: no retry, no timeout.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<AdapterRegistry>,
}

impl Router {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Find the adapter responsible for `name`.
    pub fn resolve(&self, name: &str) -> Option<&RegisteredAdapter> {
        self.registry
            .adapters()
            .iter()
            .find(|entry| name.starts_with(entry.prefix()))
    }

    /// Forward a call to its adapter and wait for the outcome.
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolResult {
        let Some(entry) = self.resolve(name) else {
            tracing::debug!(tool = %name, "No adapter prefix matches");
            return Err(format!("Unknown tool: {}", name));
        };

        tracing::debug!(tool = %name, adapter = entry.label(), "Dispatching tool call");
        let outcome = entry.adapter().invoke(name, args).await;

        if let Err(message) = &outcome {
            tracing::warn!(tool = %name, adapter = entry.label(), error = %message, "Tool call failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ForgeAdapter, ToolDescriptor};
    use async_trait::async_trait;
    use serde_json::json;

    /// Echoes the adapter label, tool name and arguments back.
    struct Echo(&'static str, &'static str);

    #[async_trait]
    impl ForgeAdapter for Echo {
        fn prefix(&self) -> &str {
            self.0
        }

        fn label(&self) -> &str {
            self.1
        }

        fn tools(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }

        async fn invoke(&self, name: &str, args: Value) -> ToolResult {
            if args.get("fail").is_some() {
                return Err(format!("{} refused {}", self.1, name));
            }
            Ok(format!("{}:{}:{}", self.1, name, args))
        }
    }

    fn router() -> Router {
        let registry = AdapterRegistry::builder()
            .register(Echo("gh_", "GitHub"))
            .register(Echo("glab_", "GitLab"))
            .register(Echo("g", "Catchall"))
            .build();
        Router::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_dispatch_by_prefix() {
        let router = router();
        let out = router.dispatch("glab_mr_list", json!({"state": "open"})).await;
        assert_eq!(out, Ok(r#"GitLab:glab_mr_list:{"state":"open"}"#.to_string()));
    }

    #[tokio::test]
    async fn test_first_registered_prefix_wins() {
        let router = router();
        assert_eq!(router.resolve("gh_repo_list").unwrap().label(), "GitHub");
        assert_eq!(router.resolve("gitea_x").unwrap().label(), "Catchall");
    }

    #[tokio::test]
    async fn test_unknown_prefix() {
        let router = router();
        assert_eq!(
            router.dispatch("bb_repo_list", json!({})).await,
            Err("Unknown tool: bb_repo_list".to_string())
        );
    }

    #[tokio::test]
    async fn test_adapter_error_is_passed_through() {
        let router = router();
        assert_eq!(
            router.dispatch("gh_issue_view", json!({"fail": true})).await,
            Err("GitHub refused gh_issue_view".to_string())
        );
    }

    #[tokio::test]
    async fn test_name_is_forwarded_verbatim_even_if_not_listed() {
        let router = router();
        let out = router.dispatch("gh_not_in_catalog", json!(null)).await;
        assert_eq!(out, Ok("GitHub:gh_not_in_catalog:null".to_string()));
    }
}
