//! Error types for poly-git-adapters
//!
//! Adapters never hand these to the core. Each is rendered with its
//! `Display` text into the failing arm of the tool outcome.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("{command} exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(String),

    #[error("Bitbucket API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("missing Bitbucket credentials: set {username_env} and {password_env}")]
    MissingCredentials {
        username_env: String,
        password_env: String,
    },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArguments {
            message: message.into(),
        }
    }
}
