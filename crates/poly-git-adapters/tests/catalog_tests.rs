//! Catalog-level checks across all four forge adapters

use std::collections::HashSet;
use std::sync::Arc;

use poly_git_adapters::{
    BitbucketAdapter, BitbucketConfig, gitea_adapter, github_adapter, gitlab_adapter,
};
use poly_git_core::{AdapterRegistry, ForgeAdapter, Router};
use serde_json::json;

fn registry() -> AdapterRegistry {
    AdapterRegistry::builder()
        .register(github_adapter("gh"))
        .register(gitlab_adapter("glab"))
        .register(gitea_adapter("tea", None))
        .register(BitbucketAdapter::new(BitbucketConfig::default()).unwrap())
        .build()
}

#[test]
fn test_full_catalog_is_consistent() {
    let registry = registry();
    registry.ensure_consistent().unwrap();
    assert_eq!(registry.prefixes(), vec!["gh_", "glab_", "tea_", "bb_"]);
    assert_eq!(registry.len(), 9 + 7 + 5 + 7);
}

#[test]
fn test_tool_names_are_unique() {
    let registry = registry();
    let names: HashSet<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names.len(), registry.len());
}

#[test]
fn test_every_schema_is_an_object_with_described_properties() {
    for tool in registry().tools() {
        assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        assert!(!tool.description.is_empty(), "{}", tool.name);

        let properties = tool.input_schema["properties"].as_object().unwrap();
        for (key, property) in properties {
            assert!(
                property["description"].is_string(),
                "{}.{} has no description",
                tool.name,
                key
            );
        }
        if let Some(required) = tool.input_schema.get("required") {
            for key in required.as_array().unwrap() {
                assert!(
                    properties.contains_key(key.as_str().unwrap()),
                    "{} requires undeclared {}",
                    tool.name,
                    key
                );
            }
        }
    }
}

#[test]
fn test_catalog_follows_registration_order() {
    let registry = registry();
    let first_bb = registry
        .tools()
        .iter()
        .position(|t| t.name.starts_with("bb_"))
        .unwrap();
    assert!(registry.tools()[..first_bb].iter().all(|t| !t.name.starts_with("bb_")));
    assert_eq!(registry.tools()[0].name, "gh_repo_list");
}

#[tokio::test]
async fn test_missing_cli_surfaces_as_tool_failure() {
    let registry = AdapterRegistry::builder()
        .register(github_adapter("poly-git-test-missing-gh"))
        .build();
    let router = Router::new(Arc::new(registry));

    let out = router
        .dispatch("gh_repo_view", json!({"repo": "octo/hello"}))
        .await;
    assert_eq!(
        out,
        Err("command not found: poly-git-test-missing-gh".to_string())
    );
}

#[tokio::test]
async fn test_bitbucket_label() {
    let adapter = BitbucketAdapter::new(BitbucketConfig::default()).unwrap();
    assert_eq!(adapter.label(), "Bitbucket");
    assert_eq!(adapter.prefix(), "bb_");
}
