//! Configuration loading and registry assembly

use std::io::Write;
use std::path::Path;

use poly_git_mcp::{Error, ServerConfig, build_registry, build_session};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
adapters = ["gitlab", "bitbucket"]

[gitlab]
binary = "glab-1.40"

[bitbucket]
base_url = "http://localhost:8080/2.0"
"#,
    );

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(config.gitlab.binary.as_deref(), Some("glab-1.40"));
    assert_eq!(config.bitbucket.base_url, "http://localhost:8080/2.0");

    let registry = build_registry(&config).unwrap();
    assert_eq!(registry.prefixes(), vec!["glab_", "bb_"]);
}

#[test]
fn test_missing_file() {
    let err = ServerConfig::load(Path::new("/nonexistent/poly-git.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[test]
fn test_malformed_file_names_path() {
    let file = write_config("adapters = [");
    let err = ServerConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_default_registry_has_every_forge() {
    let registry = build_registry(&ServerConfig::default()).unwrap();
    assert_eq!(registry.prefixes(), vec!["gh_", "glab_", "tea_", "bb_"]);
    assert!(registry.issues().is_empty());
    assert!(registry.tool("gh_pr_create").is_some());
    assert!(registry.tool("bb_pipeline_list").is_some());
}

#[test]
fn test_cli_override_replaces_file_list() {
    let file = write_config(r#"adapters = ["github"]"#);
    let config = ServerConfig::load(file.path())
        .unwrap()
        .with_overrides(Some(vec!["tea".into()]), false);

    let registry = build_registry(&config).unwrap();
    assert_eq!(registry.prefixes(), vec!["tea_"]);
}

#[test]
fn test_override_with_unknown_adapter_fails_at_build() {
    let config = ServerConfig::default().with_overrides(Some(vec!["svn".into()]), false);
    assert!(matches!(
        build_registry(&config),
        Err(Error::UnknownAdapter { .. })
    ));
}

#[test]
fn test_empty_adapter_list_serves_empty_catalog() {
    let config = ServerConfig::default().with_overrides(Some(Vec::new()), false);
    let session = build_session(&config).unwrap();
    assert!(session.router().registry().is_empty());
}
