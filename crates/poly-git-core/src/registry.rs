//! Adapter registry and tool catalog aggregation
//!
//! The registry is assembled once at start-up from an ordered list of
//! adapters and is read-only afterwards. It holds two views:
//!
//! - the prefix table, in registration order, used for routing
//! - the flat tool catalog served by `tools/list`
//!
//! Catalog problems are recorded rather than silently resolved, so the
//! binary can decide whether to refuse to start.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::{ForgeAdapter, ToolDescriptor};
use crate::error::{Error, Result};

/// An adapter together with the prefix it was registered under
#[derive(Clone)]
pub struct RegisteredAdapter {
    prefix: String,
    adapter: Arc<dyn ForgeAdapter>,
}

impl RegisteredAdapter {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn label(&self) -> &str {
        self.adapter.label()
    }

    pub fn adapter(&self) -> &Arc<dyn ForgeAdapter> {
        &self.adapter
    }
}

impl fmt::Debug for RegisteredAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAdapter")
            .field("prefix", &self.prefix)
            .field("label", &self.adapter.label())
            .finish()
    }
}

/// A configuration problem detected while aggregating the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// The same tool name was exposed twice; the first registration is kept.
    DuplicateName {
        name: String,
        kept: String,
        rejected: String,
    },
    /// A tool does not start with the prefix of the adapter exposing it.
    OutsideNamespace { name: String, prefix: String },
    /// A second adapter used an already registered prefix and was skipped.
    DuplicatePrefix { prefix: String },
}

impl From<CatalogIssue> for Error {
    fn from(issue: CatalogIssue) -> Self {
        match issue {
            CatalogIssue::DuplicateName {
                name,
                kept,
                rejected,
            } => Error::ToolCollision {
                name,
                kept,
                rejected,
            },
            CatalogIssue::OutsideNamespace { name, prefix } => {
                Error::ToolOutsideNamespace { name, prefix }
            }
            CatalogIssue::DuplicatePrefix { prefix } => Error::DuplicatePrefix { prefix },
        }
    }
}

/// Immutable registry of adapters and their aggregated tool catalog
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    adapters: Vec<RegisteredAdapter>,
    catalog: Vec<ToolDescriptor>,
    issues: Vec<CatalogIssue>,
}

impl AdapterRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registered adapters in registration order.
    pub fn adapters(&self) -> &[RegisteredAdapter] {
        &self.adapters
    }

    /// Registered prefixes in registration order.
    pub fn prefixes(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.prefix()).collect()
    }

    /// The aggregated catalog, in registration order.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Look up a descriptor by its full name.
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.catalog.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Problems found while aggregating.
    pub fn issues(&self) -> &[CatalogIssue] {
        &self.issues
    }

    /// Fail with the first recorded catalog problem, if any.
    pub fn ensure_consistent(&self) -> Result<()> {
        match self.issues.first() {
            Some(issue) => Err(issue.clone().into()),
            None => Ok(()),
        }
    }
}

/// Collects adapters before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    adapters: Vec<Arc<dyn ForgeAdapter>>,
}

impl RegistryBuilder {
    /// Register an adapter. Order of calls is the routing order.
    pub fn register(self, adapter: impl ForgeAdapter + 'static) -> Self {
        self.register_shared(Arc::new(adapter))
    }

    pub fn register_shared(mut self, adapter: Arc<dyn ForgeAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Aggregate tool catalogs and freeze the registry.
    pub fn build(self) -> AdapterRegistry {
        let mut registry = AdapterRegistry::default();
        let mut owners: HashMap<String, String> = HashMap::new();

        for adapter in self.adapters {
            let prefix = adapter.prefix().to_string();

            if registry.adapters.iter().any(|a| a.prefix == prefix) {
                tracing::warn!(prefix = %prefix, adapter = adapter.label(), "Skipping adapter with duplicate prefix");
                registry
                    .issues
                    .push(CatalogIssue::DuplicatePrefix { prefix });
                continue;
            }

            let tools = adapter.tools();
            tracing::debug!(prefix = %prefix, adapter = adapter.label(), tools = tools.len(), "Registering adapter");

            for tool in tools {
                if !tool.name.starts_with(&prefix) {
                    tracing::warn!(tool = %tool.name, prefix = %prefix, "Tool outside adapter namespace");
                    registry.issues.push(CatalogIssue::OutsideNamespace {
                        name: tool.name.clone(),
                        prefix: prefix.clone(),
                    });
                }

                if let Some(kept) = owners.get(&tool.name) {
                    tracing::warn!(tool = %tool.name, kept = %kept, rejected = adapter.label(), "Duplicate tool name");
                    registry.issues.push(CatalogIssue::DuplicateName {
                        name: tool.name.clone(),
                        kept: kept.clone(),
                        rejected: adapter.label().to_string(),
                    });
                    continue;
                }

                owners.insert(tool.name.clone(), adapter.label().to_string());
                registry.catalog.push(tool);
            }

            registry.adapters.push(RegisteredAdapter { prefix, adapter });
        }

        registry
    }
}
