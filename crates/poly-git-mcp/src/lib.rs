//! poly-git MCP server
//!
//! Wires the forge adapters into the core gateway according to a
//! [`ServerConfig`]. The binary in `main.rs` only parses flags, sets up
//! logging and calls into this crate.

pub mod config;
pub mod error;

use std::sync::Arc;

use poly_git_adapters::{
    BitbucketAdapter, gitea, gitea_adapter, github, github_adapter, gitlab, gitlab_adapter,
};
use poly_git_core::{AdapterRegistry, Router, Session};

pub use config::{AdapterKind, CliConfig, GiteaConfig, ServerConfig};
pub use error::{Error, Result};

/// Crates whose log level `--log-level` controls.
pub const LOG_TARGETS: &[&str] = &["poly_git_mcp", "poly_git_core", "poly_git_adapters"];

/// Register the enabled adapters in configured order.
pub fn build_registry(config: &ServerConfig) -> Result<AdapterRegistry> {
    let mut builder = AdapterRegistry::builder();

    for kind in config.adapter_kinds()? {
        tracing::debug!(adapter = %kind, prefix = kind.prefix(), "Enabling adapter");
        builder = match kind {
            AdapterKind::Github => {
                builder.register(github_adapter(config.github.binary_or(github::DEFAULT_BINARY)))
            }
            AdapterKind::Gitlab => {
                builder.register(gitlab_adapter(config.gitlab.binary_or(gitlab::DEFAULT_BINARY)))
            }
            AdapterKind::Gitea => builder.register(gitea_adapter(
                config.gitea.binary_or(gitea::DEFAULT_BINARY),
                config.gitea.login.as_deref(),
            )),
            AdapterKind::Bitbucket => {
                builder.register(BitbucketAdapter::new(config.bitbucket.clone())?)
            }
        };
    }

    Ok(builder.build())
}

/// Build the registry and a session over it.
///
/// Catalog problems abort start-up unless `allow_collisions` is set, in
/// which case they are only logged and the first registration wins.
pub fn build_session(config: &ServerConfig) -> Result<Session> {
    let registry = build_registry(config)?;

    if config.allow_collisions {
        for issue in registry.issues() {
            tracing::warn!(issue = ?issue, "Catalog problem ignored");
        }
    } else {
        registry.ensure_consistent()?;
    }

    tracing::info!(
        adapters = ?registry.prefixes(),
        tools = registry.len(),
        "Tool catalog ready"
    );
    Ok(Session::new(Router::new(Arc::new(registry))))
}
