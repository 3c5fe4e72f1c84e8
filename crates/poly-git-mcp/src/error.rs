//! Error types for poly-git-mcp

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Unknown adapter: {name} (expected github, gitlab, gitea or bitbucket)")]
    UnknownAdapter { name: String },

    #[error("Adapter enabled twice: {name}")]
    DuplicateAdapter { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] poly_git_core::Error),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] poly_git_adapters::Error),
}
