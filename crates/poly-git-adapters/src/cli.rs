//! Generic adapter over a forge command-line client
//!
//! A [`CliAdapter`] is a binary name plus a table of [`CliTool`]s. Each tool
//! turns its JSON arguments into an argv; the adapter runs it and returns
//! standard output. The forge modules only provide the tables.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use poly_git_core::{ForgeAdapter, ToolDescriptor, ToolResult};
use serde_json::Value;

use crate::args::Args;
use crate::command::{CommandRunner, ProcessRunner};
use crate::error::{Error, Result};

/// Builds the argv for one tool call
pub type ArgvBuilder = fn(&Args<'_>) -> Result<Vec<String>>;

/// One tool backed by a CLI subcommand
#[derive(Clone)]
pub struct CliTool {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: fn() -> Value,
    pub argv: ArgvBuilder,
}

impl CliTool {
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name, self.description, (self.schema)())
    }
}

impl fmt::Debug for CliTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliTool").field("name", &self.name).finish()
    }
}

/// Small helper for assembling argv vectors
#[derive(Debug, Default)]
pub struct Argv(Vec<String>);

impl Argv {
    pub fn new(parts: &[&str]) -> Self {
        Self(parts.iter().map(|p| p.to_string()).collect())
    }

    pub fn arg(mut self, value: impl ToString) -> Self {
        self.0.push(value.to_string());
        self
    }

    /// Push a positional argument when present.
    pub fn positional<T: ToString>(mut self, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.0.push(value.to_string());
        }
        self
    }

    /// Push `flag value` when `value` is present.
    pub fn opt<T: ToString>(mut self, flag: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.0.push(flag.to_string());
            self.0.push(value.to_string());
        }
        self
    }

    /// Push a bare `flag` when `on`.
    pub fn flag(mut self, flag: &str, on: bool) -> Self {
        if on {
            self.0.push(flag.to_string());
        }
        self
    }

    /// Push `flag value` once per value.
    pub fn repeated(mut self, flag: &str, values: &[&str]) -> Self {
        for value in values {
            self.0.push(flag.to_string());
            self.0.push(value.to_string());
        }
        self
    }

    pub fn build(self) -> Vec<String> {
        self.0
    }
}

/// Adapter that shells out to a forge CLI
pub struct CliAdapter {
    prefix: &'static str,
    label: &'static str,
    binary: String,
    extra_args: Vec<String>,
    tools: Vec<CliTool>,
    runner: Arc<dyn CommandRunner>,
}

impl CliAdapter {
    pub fn new(
        prefix: &'static str,
        label: &'static str,
        binary: impl Into<String>,
        tools: Vec<CliTool>,
    ) -> Self {
        Self {
            prefix,
            label,
            binary: binary.into(),
            extra_args: Vec::new(),
            tools,
            runner: Arc::new(ProcessRunner),
        }
    }

    /// Arguments appended to every invocation, e.g. a login selector.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn find(&self, name: &str) -> Option<&CliTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Build the full argv for a call without running it.
    pub fn plan(&self, name: &str, args: &Value) -> Result<Vec<String>> {
        let tool = self
            .find(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        let mut argv = (tool.argv)(&Args::new(args))?;
        argv.extend(self.extra_args.iter().cloned());
        Ok(argv)
    }

    async fn execute(&self, name: &str, args: &Value) -> Result<String> {
        let argv = self.plan(name, args)?;
        let output = self.runner.run(&self.binary, &argv).await?;

        if output.success() {
            Ok(output.stdout.trim_end().to_string())
        } else {
            Err(Error::CommandFailed {
                command: self.binary.clone(),
                code: output.code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

impl fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliAdapter")
            .field("prefix", &self.prefix)
            .field("binary", &self.binary)
            .field("tools", &self.tools.len())
            .finish()
    }
}

#[async_trait]
impl ForgeAdapter for CliAdapter {
    fn prefix(&self) -> &str {
        self.prefix
    }

    fn label(&self) -> &str {
        self.label
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(CliTool::descriptor).collect()
    }

    async fn invoke(&self, name: &str, args: Value) -> ToolResult {
        self.execute(name, &args).await.map_err(|e| e.to_string())
    }
}
