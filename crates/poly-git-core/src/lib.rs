//! Core of the poly-git MCP server
//!
//! This crate turns a byte stream into JSON-RPC requests and routes tool
//! calls to forge adapters. It knows nothing about any particular forge.
//!
//! # Architecture
//!
//! ```text
//! bytes ─▶ [ framing ] ─▶ [ session ] ─▶ [ router ] ─▶ ForgeAdapter::invoke
//!                              │
//!                              └──▶ [ registry ] (tools/list)
//! bytes ◀─ [ framing ] ◀─ JsonRpcResponse
//! ```
//!
//! - [`framing`] - Content-Length frame codec
//! - [`registry`] - adapter registration and tool catalog aggregation
//! - [`router`] - prefix routing of `tools/call`
//! - [`session`] - the JSON-RPC method table
//! - [`transport`] - the read-dispatch-write loop
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use poly_git_core::{AdapterRegistry, Router, Session, serve_stdio};
//!
//! let registry = AdapterRegistry::builder().register(my_adapter).build();
//! registry.ensure_consistent()?;
//! let session = Session::new(Router::new(Arc::new(registry)));
//! serve_stdio(Arc::new(session)).await?;
//! ```

pub mod adapter;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod session;
pub mod transport;

pub use adapter::{ForgeAdapter, ToolDescriptor, ToolResult};
pub use error::{Error, Result};
pub use framing::{FrameDecoder, FrameReader, FrameWriter, encode_frame};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, ServerInfo};
pub use registry::{AdapterRegistry, CatalogIssue, RegisteredAdapter, RegistryBuilder};
pub use router::Router;
pub use session::Session;
pub use transport::{Transport, serve_stdio};
