//! Shared test utilities for the poly-git workspace.
//!
//! It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`adapter`] - [`ScriptedAdapter`], a forge adapter with canned outcomes
//! - [`wire`] - helpers to build and split Content-Length framed byte streams

pub mod adapter;
pub mod wire;

pub use adapter::ScriptedAdapter;
pub use wire::{decode_all, frame, notification, request};
