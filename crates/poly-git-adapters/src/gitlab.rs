//! GitLab via the `glab` CLI

use crate::args::Args;
use crate::cli::{Argv, CliAdapter, CliTool};
use crate::error::Result;
use crate::schema::ObjectSchema;

pub const PREFIX: &str = "glab_";
pub const DEFAULT_BINARY: &str = "glab";

const ISSUE_STATES: &[&str] = &["opened", "closed", "all"];
const MR_STATES: &[&str] = &["opened", "closed", "merged", "all"];

/// GitLab adapter backed by `binary`.
pub fn gitlab_adapter(binary: impl Into<String>) -> CliAdapter {
    CliAdapter::new(PREFIX, "GitLab", binary, tools())
}

fn project(schema: ObjectSchema) -> ObjectSchema {
    schema.string("repo", "Project path, e.g. group/project")
}

/// `glab` selects non-open states with dedicated flags.
fn state_flags(argv: Argv, state: Option<&str>) -> Argv {
    match state {
        Some("closed") => argv.flag("--closed", true),
        Some("merged") => argv.flag("--merged", true),
        Some("all") => argv.flag("--all", true),
        _ => argv,
    }
}

fn list(args: &Args<'_>, subcommand: &str, states: &[&str]) -> Result<Vec<String>> {
    let argv = Argv::new(&[subcommand, "list"]).opt("--repo", Some(args.required_str("repo")?));
    Ok(state_flags(argv, args.choice("state", states)?)
        .opt("--per-page", args.u64("limit")?)
        .opt("--output", Some("json"))
        .build())
}

pub fn tools() -> Vec<CliTool> {
    vec![
        CliTool {
            name: "glab_repo_view",
            description: "Show project details",
            schema: || project(ObjectSchema::new()).required(&["repo"]).build(),
            argv: |args| {
                Ok(Argv::new(&["repo", "view"])
                    .arg(args.required_positional("repo")?)
                    .build())
            },
        },
        CliTool {
            name: "glab_issue_list",
            description: "List issues in a project",
            schema: || {
                project(ObjectSchema::new())
                    .one_of("state", "Issue state filter", ISSUE_STATES)
                    .integer("limit", "Maximum number of issues per page")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| list(args, "issue", ISSUE_STATES),
        },
        CliTool {
            name: "glab_issue_view",
            description: "Show an issue",
            schema: || {
                project(ObjectSchema::new())
                    .integer("number", "Issue IID")
                    .boolean("comments", "Include comments")
                    .required(&["repo", "number"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["issue", "view"])
                    .arg(args.required_u64("number")?)
                    .opt("--repo", Some(args.required_str("repo")?))
                    .flag("--comments", args.flag("comments")?)
                    .build())
            },
        },
        CliTool {
            name: "glab_issue_create",
            description: "Open a new issue",
            schema: || {
                project(ObjectSchema::new())
                    .string("title", "Issue title")
                    .string("description", "Issue description (Markdown)")
                    .string_list("labels", "Labels to apply")
                    .required(&["repo", "title"])
                    .build()
            },
            argv: |args| {
                let labels = args.strings("labels")?;
                Ok(Argv::new(&["issue", "create"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--title", Some(args.required_str("title")?))
                    .opt(
                        "--description",
                        Some(args.str("description")?.unwrap_or_default()),
                    )
                    .opt("--label", (!labels.is_empty()).then(|| labels.join(",")))
                    .flag("--yes", true)
                    .build())
            },
        },
        CliTool {
            name: "glab_mr_list",
            description: "List merge requests in a project",
            schema: || {
                project(ObjectSchema::new())
                    .one_of("state", "Merge request state filter", MR_STATES)
                    .integer("limit", "Maximum number of merge requests per page")
                    .required(&["repo"])
                    .build()
            },
            argv: |args| list(args, "mr", MR_STATES),
        },
        CliTool {
            name: "glab_mr_view",
            description: "Show a merge request",
            schema: || {
                project(ObjectSchema::new())
                    .integer("number", "Merge request IID")
                    .boolean("comments", "Include comments")
                    .required(&["repo", "number"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["mr", "view"])
                    .arg(args.required_u64("number")?)
                    .opt("--repo", Some(args.required_str("repo")?))
                    .flag("--comments", args.flag("comments")?)
                    .build())
            },
        },
        CliTool {
            name: "glab_mr_create",
            description: "Open a merge request",
            schema: || {
                project(ObjectSchema::new())
                    .string("title", "Merge request title")
                    .string("description", "Merge request description (Markdown)")
                    .string("source_branch", "Branch containing the changes")
                    .string("target_branch", "Branch to merge into")
                    .boolean("draft", "Mark as draft")
                    .required(&["repo", "title", "source_branch"])
                    .build()
            },
            argv: |args| {
                Ok(Argv::new(&["mr", "create"])
                    .opt("--repo", Some(args.required_str("repo")?))
                    .opt("--title", Some(args.required_str("title")?))
                    .opt(
                        "--description",
                        Some(args.str("description")?.unwrap_or_default()),
                    )
                    .opt("--source-branch", Some(args.required_str("source_branch")?))
                    .opt("--target-branch", args.str("target_branch")?)
                    .flag("--draft", args.flag("draft")?)
                    .flag("--yes", true)
                    .build())
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_git_core::ForgeAdapter;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn plan(name: &str, args: Value) -> Vec<String> {
        gitlab_adapter(DEFAULT_BINARY).plan(name, &args).unwrap()
    }

    #[test]
    fn test_catalog() {
        let names: Vec<String> = gitlab_adapter(DEFAULT_BINARY)
            .tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "glab_repo_view",
                "glab_issue_list",
                "glab_issue_view",
                "glab_issue_create",
                "glab_mr_list",
                "glab_mr_view",
                "glab_mr_create"
            ]
        );
    }

    #[rstest]
    #[case(None, vec![])]
    #[case(Some("opened"), vec![])]
    #[case(Some("closed"), vec!["--closed"])]
    #[case(Some("merged"), vec!["--merged"])]
    #[case(Some("all"), vec!["--all"])]
    fn test_mr_list_state_flags(#[case] state: Option<&str>, #[case] flags: Vec<&str>) {
        let mut expected = vec!["mr", "list", "--repo", "grp/proj"];
        expected.extend(flags);
        expected.extend(["--output", "json"]);

        assert_eq!(
            plan("glab_mr_list", json!({"repo": "grp/proj", "state": state})),
            expected
        );
    }

    #[test]
    fn test_repo_view_rejects_option_like_project() {
        let err = gitlab_adapter(DEFAULT_BINARY)
            .plan("glab_repo_view", &json!({"repo": "--web"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid arguments: 'repo' must not start with '-'");
    }

    #[test]
    fn test_issue_list_rejects_merged() {
        let err = gitlab_adapter(DEFAULT_BINARY)
            .plan("glab_issue_list", &json!({"repo": "g/p", "state": "merged"}))
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid arguments"));
    }

    #[test]
    fn test_issue_create_joins_labels() {
        assert_eq!(
            plan(
                "glab_issue_create",
                json!({"repo": "g/p", "title": "Broken", "labels": ["bug", "p1"]})
            ),
            vec![
                "issue", "create", "--repo", "g/p", "--title", "Broken", "--description", "",
                "--label", "bug,p1", "--yes"
            ]
        );
    }

    #[test]
    fn test_mr_create() {
        assert_eq!(
            plan(
                "glab_mr_create",
                json!({"repo": "g/p", "title": "Feat", "source_branch": "feat", "target_branch": "main"})
            ),
            vec![
                "mr", "create", "--repo", "g/p", "--title", "Feat", "--description", "",
                "--source-branch", "feat", "--target-branch", "main", "--yes"
            ]
        );
    }

    #[test]
    fn test_mr_view_with_comments() {
        assert_eq!(
            plan("glab_mr_view", json!({"repo": "g/p", "number": 7, "comments": true})),
            vec!["mr", "view", "7", "--repo", "g/p", "--comments"]
        );
    }
}
