//! Gitea via the `tea` CLI

use crate::args::Args;
use crate::cli::{Argv, CliAdapter, CliTool};
use crate::error::Result;
use crate::schema::ObjectSchema;

pub const PREFIX: &str = "tea_";
pub const DEFAULT_BINARY: &str = "tea";

const STATES: &[&str] = &["open", "closed", "all"];

/// Gitea adapter backed by `binary`. A `login` selects one of the logins
/// configured in `tea` and is passed with every call.
pub fn gitea_adapter(binary: impl Into<String>, login: Option<&str>) -> CliAdapter {
    let extra = login
        .map(|login| vec!["--login".to_string(), login.to_string()])
        .unwrap_or_default();
    CliAdapter::new(PREFIX, "Gitea", binary, tools()).with_extra_args(extra)
}

fn repo(schema: ObjectSchema) -> ObjectSchema {
    schema.string("repo", "Repository in OWNER/REPO form")
}

fn list(args: &Args<'_>, subcommand: &str) -> Result<Vec<String>> {
    Ok(Argv::new(&[subcommand, "list"])
        .opt("--repo", Some(args.required_str("repo")?))
        .opt("--state", args.choice("state", STATES)?)
        .opt("--limit", args.u64("limit")?)
        .opt("--output", Some("json"))
        .build())
}

pub fn tools() -> Vec<CliTool> {
    vec![
        CliTool {
            name: "tea_repo_list",
            description: "List repositories visible to the current login",
            schema: || {
                ObjectSchema::new()
                    .integer("limit", "Maximum number of repositories")
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["repos", "list"])
                    .opt("--limit", args.u64("limit")?)
                    .opt("--output", Some("json"))
                    .build())
            },
        },
        CliTool {
            name: "tea_issue_list",
            description: "List issues in a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .one_of("state", "Issue state filter", STATES)
                    .integer("limit", "Maximum number of issues")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| list(args, "issues"),
        },
        CliTool {
            name: "tea_issue_create",
            description: "Open a new issue",
            schema: || {
                repo(ObjectSchema::new())
                    .string("title", "Issue title")
                    .string("description", "Issue description (Markdown)")
                    .string_list("labels", "Labels to apply")
                    .required(&["repo", "title"])
                    .build()
            },
            argv: |args| {
                let labels = args.strings("labels")?;
                Ok(Argv::new(&["issues", "create"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--title", Some(args.required_str("title")?))
                    .opt("--description", args.str("description")?)
                    .opt("--labels", (!labels.is_empty()).then(|| labels.join(",")))
                    .build())
            },
        },
        CliTool {
            name: "tea_pr_list",
            description: "List pull requests in a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .one_of("state", "Pull request state filter", STATES)
                    .integer("limit", "Maximum number of pull requests")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| list(args, "pulls"),
        },
        CliTool {
            name: "tea_release_list",
            description: "List releases of a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .integer("limit", "Maximum number of releases")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["releases", "list"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--limit", args.u64("limit")?)
                    .opt("--output", Some("json"))
                    .build())
            },
        },
    ]
}
