//! Workspace loading integration tests
//!
//! A workspace on disk: collections file, environment file and `.env`
//! defaults, resolved together through the scope resolver.

use super::{executor_over, MockTransport};
use rest_chain::collection::{CollectionStore, InMemoryCollectionStore};
use rest_chain::environment::{load_dotenv, load_environments, EnvironmentSession};
use rest_chain::store::ResponseStore;
use rest_chain::variables::{ResolveOptions, VariableMap, VariableScopeResolver};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const WORKSPACE: &str = r#"{
  "collections": [
    {
      "id": "shop",
      "name": "Shop API",
      "variables": { "baseUrl": "{{host}}/api", "pageSize": "20" },
      "requests": [
        {
          "id": "login",
          "name": "login",
          "method": "POST",
          "url": "{{baseUrl}}/login",
          "headers": { "Content-Type": "application/json" },
          "body": "{\"user\": \"{{user}}\"}"
        },
        {
          "id": "orders",
          "name": "orders",
          "url": "{{baseUrl}}/orders?size={{pageSize}}",
          "prerequisite": "login",
          "auth": { "type": "bearer", "token": "{{login.response.body.token}}" }
        },
        {
          "id": "legacy",
          "url": "{{baseUrl}}/legacy",
          "auth": { "type": "apiKey", "key": "api_key", "value": "{{legacyKey}}", "location": "query" }
        }
      ]
    }
  ]
}"#;

const ENVIRONMENTS: &str = r#"{
  "$shared": { "user": "ada" },
  "dev": {
    "host": "http://localhost:8080",
    "legacyKey": { "value": "old-key", "enabled": false }
  },
  "prod": {
    "host": "https://shop.example.com",
    "pageSize": "50"
  },
  "$active": "dev"
}"#;

const DOTENV: &str = "# workspace defaults\nhost=http://fallback\nlegacyKey=\"dotenv-key\"\n";

fn write_workspace(dir: &Path) {
    fs::write(dir.join("rest-chain.json"), WORKSPACE).unwrap();
    fs::write(dir.join(".http-client-env.json"), ENVIRONMENTS).unwrap();
    fs::write(dir.join(".env"), DOTENV).unwrap();
}

fn load_store(dir: &Path) -> (InMemoryCollectionStore, EnvironmentSession) {
    let session = EnvironmentSession::new(load_environments(dir).unwrap());
    let store = InMemoryCollectionStore::load_workspace_file(&dir.join("rest-chain.json"))
        .unwrap()
        .with_environments(session.clone())
        .with_defaults(load_dotenv(dir).unwrap());
    (store, session)
}

#[test]
fn test_workspace_scopes_layer_in_order() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace(temp_dir.path());
    let (store, session) = load_store(temp_dir.path());

    assert_eq!(store.request_ids(), vec!["legacy", "login", "orders"]);
    assert_eq!(session.get_active_environment_name().as_deref(), Some("dev"));

    let resolver = VariableScopeResolver::new(Arc::new(store), ResponseStore::new());
    let scope = resolver.get_resolved_variables(Some("shop"), None);

    assert_eq!(scope.get("host").map(String::as_str), Some("http://localhost:8080"));
    assert_eq!(scope.get("user").map(String::as_str), Some("ada"));
    assert_eq!(scope.get("pageSize").map(String::as_str), Some("20"));
    // disabled in dev, so the .env default shows through
    assert_eq!(scope.get("legacyKey").map(String::as_str), Some("dotenv-key"));

    session.set_active_environment("prod").unwrap();
    let scope = resolver.get_resolved_variables(Some("shop"), None);
    assert_eq!(scope.get("host").map(String::as_str), Some("https://shop.example.com"));
    assert_eq!(scope.get("pageSize").map(String::as_str), Some("50"));
}

#[test]
fn test_resolve_request_from_workspace() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace(temp_dir.path());
    let (store, _) = load_store(temp_dir.path());

    let login = store.find_prerequisite("login").unwrap();
    let resolver = VariableScopeResolver::new(Arc::new(store), ResponseStore::new());
    let resolved = resolver
        .resolve_request(&login, None, ResolveOptions::default().strict())
        .unwrap();

    assert_eq!(resolved.url, "http://localhost:8080/api/login");
    assert_eq!(resolved.body.as_deref(), Some(r#"{"user": "ada"}"#));
    assert_eq!(resolved.header("content-type"), Some("application/json"));
}

#[test]
fn test_missing_environment_and_dotenv_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("rest-chain.json"), WORKSPACE).unwrap();
    let (store, session) = load_store(temp_dir.path());

    assert!(session.list_environment_names().is_empty());
    assert!(store.default_variables().is_empty());

    let overrides = VariableMap::from([("host".to_string(), "http://override".to_string())]);
    let resolver = VariableScopeResolver::new(Arc::new(store), ResponseStore::new());
    assert_eq!(
        resolver
            .resolve_text("{{baseUrl}}/x", Some("shop"), Some(&overrides), ResolveOptions::default())
            .unwrap(),
        "http://override/api/x"
    );
}

#[tokio::test]
async fn test_send_through_loaded_workspace() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace(temp_dir.path());
    let (store, _) = load_store(temp_dir.path());
    let orders = store.find_prerequisite("orders").unwrap();
    let legacy = store.find_prerequisite("legacy").unwrap();

    let transport = MockTransport::new();
    transport.respond("http://localhost:8080/api/login", 200, r#"{"token":"jwt-1"}"#);

    let (executor, responses) = executor_over(store, transport.clone());
    executor.send(&orders, None).await.unwrap();
    executor.send(&legacy, None).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].method.as_str(), "POST");
    assert_eq!(sent[1].url, "http://localhost:8080/api/orders?size=20");
    assert_eq!(sent[1].header("Authorization"), Some("Bearer jwt-1"));
    assert_eq!(sent[2].url, "http://localhost:8080/api/legacy?api_key=dotenv-key");

    assert_eq!(responses.names(), vec!["login", "orders"]);
}
