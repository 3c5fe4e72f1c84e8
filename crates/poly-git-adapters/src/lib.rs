//! Forge adapters for the poly-git MCP server
//!
//! | Forge     | Prefix  | Backend                         |
//! |-----------|---------|---------------------------------|
//! | GitHub    | `gh_`   | `gh` CLI                        |
//! | GitLab    | `glab_` | `glab` CLI                      |
//! | Gitea     | `tea_`  | `tea` CLI                       |
//! | Bitbucket | `bb_`   | REST API 2.0 over `reqwest`     |
//!
//! The three CLI forges share [`CliAdapter`]: a binary plus a table of
//! tools, each mapping JSON arguments to an argv. Failures of any kind are
//! reported through the `Err` arm of the tool outcome.

pub mod args;
pub mod bitbucket;
pub mod cli;
pub mod command;
pub mod error;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod schema;

pub use bitbucket::{BitbucketAdapter, BitbucketConfig};
pub use cli::{CliAdapter, CliTool};
pub use command::{CommandOutput, CommandRunner, ProcessRunner};
pub use error::{Error, Result};
pub use gitea::gitea_adapter;
pub use github::github_adapter;
pub use gitlab::gitlab_adapter;
