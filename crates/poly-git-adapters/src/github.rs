//! GitHub via the `gh` CLI

use crate::cli::{Argv, CliAdapter, CliTool};
use crate::schema::ObjectSchema;

pub const PREFIX: &str = "gh_";
pub const DEFAULT_BINARY: &str = "gh";

const STATES: &[&str] = &["open", "closed", "all"];
const PR_STATES: &[&str] = &["open", "closed", "merged", "all"];

const REPO_FIELDS: &str = "name,owner,description,url,visibility,isFork,updatedAt";
const REPO_VIEW_FIELDS: &str =
    "name,owner,description,url,defaultBranchRef,stargazerCount,forkCount,licenseInfo";
const ISSUE_FIELDS: &str = "number,title,state,author,labels,createdAt,url";
const ISSUE_VIEW_FIELDS: &str = "number,title,body,state,author,labels,assignees,comments,url";
const PR_FIELDS: &str = "number,title,state,author,headRefName,baseRefName,isDraft,url";
const PR_VIEW_FIELDS: &str =
    "number,title,body,state,author,headRefName,baseRefName,mergeable,reviewDecision,url";

/// GitHub adapter backed by `binary`.
pub fn github_adapter(binary: impl Into<String>) -> CliAdapter {
    CliAdapter::new(PREFIX, "GitHub", binary, tools())
}

fn repo(schema: ObjectSchema) -> ObjectSchema {
    schema.string("repo", "Repository in OWNER/REPO form")
}

pub fn tools() -> Vec<CliTool> {
    vec![
        CliTool {
            name: "gh_repo_list",
            description: "List repositories of a user or organization",
            schema: || {
                ObjectSchema::new()
                    .string("owner", "User or organization; defaults to the authenticated user")
                    .integer("limit", "Maximum number of repositories (default 30)")
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["repo", "list"])
                    .positional(args.positional("owner")?)
                    .opt("--limit", args.u64("limit")?)
                    .opt("--json", Some(REPO_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_repo_view",
            description: "Show repository details",
            schema: || repo(ObjectSchema::new()).build(),
            argv: |args| {
                Ok(Argv::new(&["repo", "view"])
                    .positional(args.positional("repo")?)
                    .opt("--json", Some(REPO_VIEW_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_issue_list",
            description: "List issues in a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .one_of("state", "Issue state filter", STATES)
                    .string_list("labels", "Only issues with these labels")
                    .string("assignee", "Only issues assigned to this user")
                    .integer("limit", "Maximum number of issues (default 30)")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["issue", "list"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--state", args.choice("state", STATES)?)
                    .repeated("--label", &args.strings("labels")?)
                    .opt("--assignee", args.str("assignee")?)
                    .opt("--limit", args.u64("limit")?)
                    .opt("--json", Some(ISSUE_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_issue_view",
            description: "Show an issue with its comments",
            schema: || {
                repo(ObjectSchema::new())
                    .integer("number", "Issue number")
                    .required(&["repo", "number"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["issue", "view"])
                    .arg(args.required_u64("number")?)
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--json", Some(ISSUE_VIEW_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_issue_create",
            description: "Open a new issue",
            schema: || {
                repo(ObjectSchema::new())
                    .string("title", "Issue title")
                    .string("body", "Issue body (Markdown)")
                    .string_list("labels", "Labels to apply")
                    .string_list("assignees", "Users to assign")
                    .required(&["repo", "title"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["issue", "create"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--title", Some(args.required_str("title")?))
                    .opt("--body", Some(args.str("body")?.unwrap_or_default()))
                    .repeated("--label", &args.strings("labels")?)
                    .repeated("--assignee", &args.strings("assignees")?)
                    .build())
            },
        },
        CliTool {
            name: "gh_pr_list",
            description: "List pull requests in a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .one_of("state", "Pull request state filter", PR_STATES)
                    .string("base", "Only pull requests targeting this branch")
                    .integer("limit", "Maximum number of pull requests (default 30)")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["pr", "list"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--state", args.choice("state", PR_STATES)?)
                    .opt("--base", args.str("base")?)
                    .opt("--limit", args.u64("limit")?)
                    .opt("--json", Some(PR_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_pr_view",
            description: "Show a pull request",
            schema: || {
                repo(ObjectSchema::new())
                    .integer("number", "Pull request number")
                    .required(&["repo", "number"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["pr", "view"])
                    .arg(args.required_u64("number")?)
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--json", Some(PR_VIEW_FIELDS))
                    .build())
            },
        },
        CliTool {
            name: "gh_pr_create",
            description: "Open a pull request",
            schema: || {
                repo(ObjectSchema::new())
                    .string("title", "Pull request title")
                    .string("body", "Pull request body (Markdown)")
                    .string("head", "Branch containing the changes")
                    .string("base", "Branch to merge into; defaults to the default branch")
                    .boolean("draft", "Open as a draft")
                    .required(&["repo", "title", "head"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["pr", "create"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--title", Some(args.required_str("title")?))
                    .opt("--body", Some(args.str("body")?.unwrap_or_default()))
                    .opt("--head", Some(args.required_str("head")?))
                    .opt("--base", args.str("base")?)
                    .flag("--draft", args.flag("draft")?)
                    .build())
            },
        },
        CliTool {
            name: "gh_release_list",
            description: "List releases of a repository",
            schema: || {
                repo(ObjectSchema::new())
                    .integer("limit", "Maximum number of releases (default 30)")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["release", "list"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--limit", args.u64("limit")?)
                    .build())
            },
        },
    ]
}
