//! Bitbucket Cloud via its REST API 2.0
//!
//! Bitbucket has no first-party CLI, so this adapter talks HTTP directly.
//! Credentials are an account username and an app password, both read from
//! environment variables at call time. Successful responses are returned
//! as pretty-printed JSON.

use std::time::Duration;

use async_trait::async_trait;
use poly_git_core::{ForgeAdapter, ToolDescriptor, ToolResult};
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::args::Args;
use crate::error::{Error, Result};
use crate::schema::ObjectSchema;

pub const PREFIX: &str = "bb_";
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";
pub const DEFAULT_USERNAME_ENV: &str = "BITBUCKET_USERNAME";
pub const DEFAULT_APP_PASSWORD_ENV: &str = "BITBUCKET_APP_PASSWORD";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PR_STATES: &[&str] = &["OPEN", "MERGED", "DECLINED", "SUPERSEDED"];

/// Connection settings for the Bitbucket adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketConfig {
    pub base_url: String,
    /// Environment variable holding the account username
    pub username_env: String,
    /// Environment variable holding the app password
    pub app_password_env: String,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username_env: DEFAULT_USERNAME_ENV.to_string(),
            app_password_env: DEFAULT_APP_PASSWORD_ENV.to_string(),
        }
    }
}

/// A planned API call, independent of credentials and transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments below the base URL, unescaped
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(segments: &[&str]) -> Self {
        Self {
            method: Method::GET,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    fn query(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }
}

pub struct BitbucketAdapter {
    config: BitbucketConfig,
    client: Client,
}

impl BitbucketAdapter {
    pub fn new(config: BitbucketConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("poly-git-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BitbucketConfig {
        &self.config
    }

    fn credentials(&self) -> Result<(String, String)> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        match (
            read(&self.config.username_env),
            read(&self.config.app_password_env),
        ) {
            (Some(user), Some(password)) => Ok((user, password)),
            _ => Err(Error::MissingCredentials {
                username_env: self.config.username_env.clone(),
                password_env: self.config.app_password_env.clone(),
            }),
        }
    }

    /// Resolve a planned request against the configured base URL.
    pub fn url(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Url(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Url(format!("{}: cannot be a base", self.config.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }

    async fn execute(&self, name: &str, args: &Value) -> Result<String> {
        let request = plan(name, &Args::new(args))?;
        let (username, password) = self.credentials()?;
        let url = self.url(&request)?;

        tracing::debug!(method = %request.method, url = %url, "Bitbucket request");

        let mut builder = self
            .client
            .request(request.method, url)
            .basic_auth(username, Some(password))
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }
        Ok(render(&text))
    }
}

#[async_trait]
impl ForgeAdapter for BitbucketAdapter {
    fn prefix(&self) -> &str {
        PREFIX
    }

    fn label(&self) -> &str {
        "Bitbucket"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        tools()
    }

    async fn invoke(&self, name: &str, args: Value) -> ToolResult {
        self.execute(name, &args).await.map_err(|e| e.to_string())
    }
}

/// Pretty-print JSON bodies; anything else is passed through.
fn render(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.trim_end().to_string(),
    }
}

/// Bitbucket wraps failures as `{"type": "error", "error": {"message": ..}}`.
fn error_message(text: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(text)
        && let Some(message) = value.pointer("/error/message").and_then(Value::as_str)
    {
        return message.to_string();
    }
    match text.trim() {
        "" => reason.unwrap_or("request failed").to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn workspace_schema() -> ObjectSchema {
    ObjectSchema::new().string("workspace", "Workspace ID or slug")
}

fn repo_schema() -> ObjectSchema {
    workspace_schema().string("repo_slug", "Repository slug")
}

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "bb_repo_list",
            "List repositories in a workspace",
            workspace_schema()
                .integer("limit", "Page size (default 10, max 100)")
                .required(&["workspace"])
                .build(),
        ),
        ToolDescriptor::new(
            "bb_repo_get",
            "Show repository details",
            repo_schema().required(&["workspace", "repo_slug"]).build(),
        ),
        ToolDescriptor::new(
            "bb_pr_list",
            "List pull requests in a repository",
            repo_schema()
                .one_of("state", "Pull request state filter", PR_STATES)
                .integer("limit", "Page size")
                .required(&["workspace", "repo_slug"])
                .build(),
        ),
        ToolDescriptor::new(
            "bb_pr_get",
            "Show a pull request",
            repo_schema()
                .integer("pr_id", "Pull request ID")
                .required(&["workspace", "repo_slug", "pr_id"])
                .build(),
        ),
        ToolDescriptor::new(
            "bb_pr_create",
            "Open a pull request",
            repo_schema()
                .string("title", "Pull request title")
                .string("description", "Pull request description (Markdown)")
                .string("source_branch", "Branch containing the changes")
                .string("destination_branch", "Branch to merge into; defaults to the main branch")
                .boolean("close_source_branch", "Delete the source branch after merge")
                .required(&["workspace", "repo_slug", "title", "source_branch"])
                .build(),
        ),
        ToolDescriptor::new(
            "bb_issue_list",
            "List issues of a repository with the issue tracker enabled",
            repo_schema()
                .integer("limit", "Page size")
                .required(&["workspace", "repo_slug"])
                .build(),
        ),
        ToolDescriptor::new(
            "bb_pipeline_list",
            "List recent pipeline runs, newest first",
            repo_schema()
                .integer("limit", "Page size")
                .required(&["workspace", "repo_slug"])
                .build(),
        ),
    ]
}

/// Translate a tool call into an API request.
pub fn plan<'a>(name: &str, args: &Args<'a>) -> Result<ApiRequest> {
    let repo = || -> Result<[&'a str; 3]> {
        Ok([
            "repositories",
            args.required_str("workspace")?,
            args.required_str("repo_slug")?,
        ])
    };

    let request = match name {
        "bb_repo_list" => ApiRequest::get(&["repositories", args.required_str("workspace")?])
            .query("pagelen", args.u64("limit")?),
        "bb_repo_get" => ApiRequest::get(&repo()?),
        "bb_pr_list" => {
            let [a, b, c] = repo()?;
            ApiRequest::get(&[a, b, c, "pullrequests"])
                .query("state", args.choice("state", PR_STATES)?)
                .query("pagelen", args.u64("limit")?)
        }
        "bb_pr_get" => {
            let [a, b, c] = repo()?;
            let id = args.required_u64("pr_id")?.to_string();
            ApiRequest::get(&[a, b, c, "pullrequests", id.as_str()])
        }
        "bb_pr_create" => {
            let [a, b, c] = repo()?;
            let mut body = json!({
                "title": args.required_str("title")?,
                "source": {"branch": {"name": args.required_str("source_branch")?}},
                "close_source_branch": args.flag("close_source_branch")?,
            });
            if let Some(description) = args.str("description")? {
                body["description"] = json!(description);
            }
            if let Some(destination) = args.str("destination_branch")? {
                body["destination"] = json!({"branch": {"name": destination}});
            }
            ApiRequest {
                method: Method::POST,
                body: Some(body),
                ..ApiRequest::get(&[a, b, c, "pullrequests"])
            }
        }
        "bb_issue_list" => {
            let [a, b, c] = repo()?;
            ApiRequest::get(&[a, b, c, "issues"]).query("pagelen", args.u64("limit")?)
        }
        "bb_pipeline_list" => {
            let [a, b, c] = repo()?;
            ApiRequest::get(&[a, b, c, "pipelines"])
                .query("sort", Some("-created_on"))
                .query("pagelen", args.u64("limit")?)
        }
        _ => return Err(Error::UnknownTool(name.to_string())),
    };
    Ok(request)
}
