//! Server configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. Every key is optional:
//!
//! ```toml
//! adapters = ["github", "gitlab", "gitea", "bitbucket"]
//! allow_collisions = false
//!
//! [github]
//! binary = "gh"
//!
//! [gitea]
//! login = "work"
//!
//! [bitbucket]
//! username_env = "BITBUCKET_USERNAME"
//! app_password_env = "BITBUCKET_APP_PASSWORD"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use poly_git_adapters::BitbucketConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A forge backend that can be enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Github,
    Gitlab,
    Gitea,
    Bitbucket,
}

impl AdapterKind {
    /// All adapters in default routing order.
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Github,
        AdapterKind::Gitlab,
        AdapterKind::Gitea,
        AdapterKind::Bitbucket,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            AdapterKind::Github => poly_git_adapters::github::PREFIX,
            AdapterKind::Gitlab => poly_git_adapters::gitlab::PREFIX,
            AdapterKind::Gitea => poly_git_adapters::gitea::PREFIX,
            AdapterKind::Bitbucket => poly_git_adapters::bitbucket::PREFIX,
        }
    }
}

impl FromStr for AdapterKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" | "gh" => Ok(AdapterKind::Github),
            "gitlab" | "glab" => Ok(AdapterKind::Gitlab),
            "gitea" | "tea" => Ok(AdapterKind::Gitea),
            "bitbucket" | "bb" => Ok(AdapterKind::Bitbucket),
            _ => Err(Error::UnknownAdapter {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Github => write!(f, "github"),
            AdapterKind::Gitlab => write!(f, "gitlab"),
            AdapterKind::Gitea => write!(f, "gitea"),
            AdapterKind::Bitbucket => write!(f, "bitbucket"),
        }
    }
}

/// Settings for a CLI-backed forge
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Program name or path; the forge's usual binary when unset
    pub binary: Option<String>,
}

impl CliConfig {
    pub fn binary_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.binary.as_deref().unwrap_or(default)
    }
}

/// Settings for the Gitea forge
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GiteaConfig {
    pub binary: Option<String>,
    /// `tea` login to select on every call
    pub login: Option<String>,
}

impl GiteaConfig {
    pub fn binary_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.binary.as_deref().unwrap_or(default)
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Enabled adapters, in routing order
    pub adapters: Vec<String>,
    /// Serve even when the tool catalog has collisions
    pub allow_collisions: bool,
    pub github: CliConfig,
    pub gitlab: CliConfig,
    pub gitea: GiteaConfig,
    pub bitbucket: BitbucketConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            adapters: AdapterKind::ALL.iter().map(|k| k.to_string()).collect(),
            allow_collisions: false,
            github: CliConfig::default(),
            gitlab: CliConfig::default(),
            gitea: GiteaConfig::default(),
            bitbucket: BitbucketConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse TOML content; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.adapter_kinds()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file settings.
    pub fn with_overrides(mut self, adapters: Option<Vec<String>>, allow_collisions: bool) -> Self {
        if let Some(adapters) = adapters {
            self.adapters = adapters;
        }
        self.allow_collisions |= allow_collisions;
        self
    }

    /// Enabled adapters in order. Unknown and repeated names are rejected.
    pub fn adapter_kinds(&self) -> Result<Vec<AdapterKind>> {
        let mut seen = HashSet::new();
        let mut kinds = Vec::with_capacity(self.adapters.len());

        for name in &self.adapters {
            let kind: AdapterKind = name.parse()?;
            if !seen.insert(kind) {
                return Err(Error::DuplicateAdapter {
                    name: kind.to_string(),
                });
            }
            kinds.push(kind);
        }
        Ok(kinds)
    }
}
