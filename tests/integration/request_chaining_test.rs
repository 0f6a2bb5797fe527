//! Prerequisite chain integration tests
//!
//! These tests run whole sends through the chain executor with a scripted
//! transport and check ordering, response capture, and failure handling.

use super::{executor_for, executor_over, MockTransport};
use async_trait::async_trait;
use rest_chain::auth::AuthScheme;
use rest_chain::chain::{
    ChainError, FailureDecision, FailureHandler, PrerequisiteFailurePolicy,
};
use rest_chain::collection::{Collection, InMemoryCollectionStore};
use rest_chain::environment::{Environment, EnvironmentSession, Environments};
use rest_chain::executor::RequestError;
use rest_chain::models::{HttpMethod, HttpResponse, RequestDefinition};
use rest_chain::variables::{ResolveError, ResolveOptions, VariableMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn login_collection() -> Collection {
    let mut collection = Collection::new("api", "API");
    collection.set_variable("baseUrl", "https://api.example.com");

    let mut login =
        RequestDefinition::new("login", HttpMethod::POST, "{{baseUrl}}/login").with_name("login");
    login.set_body(r#"{"user": "ada"}"#);
    collection.add_request(login);

    let mut profile = RequestDefinition::new("profile", HttpMethod::GET, "{{baseUrl}}/me")
        .with_name("profile")
        .with_prerequisite("login");
    profile.add_header(
        "Authorization",
        "Bearer {{login.response.body.data.token}}",
    );
    collection.add_request(profile);

    collection
}

fn request(collection: &Collection, id: &str) -> RequestDefinition {
    collection
        .requests
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn test_login_token_flows_into_target() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.respond(
        "https://api.example.com/login",
        200,
        r#"{"data":{"token":"abc"}}"#,
    );
    transport.respond("https://api.example.com/me", 200, r#"{"name":"Ada"}"#);

    let (executor, responses) = executor_for(collection, transport.clone());
    let outcome = executor.send(&target, None).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].url, "https://api.example.com/login");
    assert_eq!(sent[1].header("Authorization"), Some("Bearer abc"));

    assert_eq!(outcome.response.body, r#"{"name":"Ada"}"#);
    assert_eq!(outcome.prerequisites.len(), 1);
    assert_eq!(outcome.prerequisites[0].id, "login");
    assert_eq!(outcome.prerequisites[0].decision, FailureDecision::Continue);

    assert_eq!(
        responses.resolve_reference("login.response.body.data.token"),
        Some("abc".to_string())
    );
    assert_eq!(
        responses.resolve_reference("profile.response.body.name"),
        Some("Ada".to_string())
    );
}

#[tokio::test]
async fn test_mutual_prerequisites_are_rejected_before_sending() {
    let mut collection = Collection::new("api", "API");
    collection.add_request(
        RequestDefinition::new("a", HttpMethod::GET, "http://x/a").with_prerequisite("b"),
    );
    collection.add_request(
        RequestDefinition::new("b", HttpMethod::GET, "http://x/b").with_prerequisite("a"),
    );
    let target = request(&collection, "a");
    let transport = MockTransport::new();

    let (executor, _) = executor_for(collection, transport.clone());
    let err = executor.send(&target, None).await.unwrap_err();

    assert_eq!(
        err,
        ChainError::CyclicDependency(vec!["a".to_string(), "b".to_string(), "a".to_string()])
    );
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_deep_chain_runs_bottom_up() {
    let mut collection = Collection::new("api", "API");
    collection.add_request(
        RequestDefinition::new("tenant", HttpMethod::GET, "http://x/tenant").with_name("tenant"),
    );
    collection.add_request(
        RequestDefinition::new("login", HttpMethod::POST, "http://x/login/{{tenant.response.body.id}}")
            .with_name("login")
            .with_prerequisite("tenant"),
    );
    collection.add_request(
        RequestDefinition::new("orders", HttpMethod::GET, "http://x/orders?t={{login.response.body.token}}")
            .with_name("orders")
            .with_prerequisite("login"),
    );
    let target = request(&collection, "orders");

    let transport = MockTransport::new();
    transport.respond("http://x/tenant", 200, r#"{"id":"t-9"}"#);
    transport.respond("http://x/login/t-9", 200, r#"{"token":"tok"}"#);

    let (executor, _) = executor_for(collection, transport.clone());
    let outcome = executor.send(&target, None).await.unwrap();

    assert_eq!(
        transport.sent_urls(),
        vec!["http://x/tenant", "http://x/login/t-9", "http://x/orders?t=tok"]
    );
    let order: Vec<&str> = outcome.prerequisites.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["tenant", "login"]);
}

#[tokio::test]
async fn test_failed_prerequisite_aborts_by_default() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.respond("https://api.example.com/login", 401, r#"{"error":"denied"}"#);

    let (executor, responses) = executor_for(collection, transport.clone());
    let err = executor.send(&target, None).await.unwrap_err();

    assert_eq!(
        err,
        ChainError::PrerequisiteFailed {
            request: "login".to_string(),
            status: 401,
        }
    );
    assert_eq!(transport.sent().len(), 1);
    // the failed response is still stored for inspection
    assert_eq!(
        responses.resolve_reference("login.response.status"),
        Some("401".to_string())
    );
}

#[tokio::test]
async fn test_continue_policy_sends_target_with_unresolved_marker() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.respond("https://api.example.com/login", 500, "oops");

    let (executor, _) = executor_for(collection, transport.clone());
    let executor = executor.with_failure_handler(Arc::new(PrerequisiteFailurePolicy::Continue));
    let outcome = executor.send(&target, None).await.unwrap();

    assert_eq!(outcome.prerequisites[0].status, 500);
    assert_eq!(outcome.prerequisites[0].decision, FailureDecision::Continue);
    assert_eq!(
        transport.sent()[1].header("Authorization"),
        Some("Bearer {{login.response.body.data.token}}")
    );
}

struct CountingHandler {
    calls: AtomicUsize,
    decision: FailureDecision,
}

#[async_trait]
impl FailureHandler for CountingHandler {
    async fn on_prerequisite_failure(
        &self,
        prerequisite: &RequestDefinition,
        response: &HttpResponse,
    ) -> FailureDecision {
        assert_eq!(prerequisite.id, "login");
        assert_eq!(response.status, 503);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.decision
    }
}

#[tokio::test]
async fn test_custom_failure_handler_is_consulted_once() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.respond("https://api.example.com/login", 503, "");

    let handler = Arc::new(CountingHandler {
        calls: AtomicUsize::new(0),
        decision: FailureDecision::Abort,
    });
    let (executor, _) = executor_for(collection, transport.clone());
    let executor = executor.with_failure_handler(handler.clone());

    assert!(executor.send(&target, None).await.is_err());
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prerequisite_transport_error() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.fail(
        "https://api.example.com/login",
        RequestError::NetworkError("connection refused".to_string()),
    );

    let (executor, _) = executor_for(collection, transport.clone());
    let err = executor.send(&target, None).await.unwrap_err();

    assert_eq!(
        err,
        ChainError::PrerequisiteExecution {
            request: "login".to_string(),
            message: "Network error: connection refused".to_string(),
        }
    );
}

#[tokio::test]
async fn test_target_transport_error() {
    let collection = login_collection();
    let target = request(&collection, "login");
    let transport = MockTransport::new();
    transport.fail("https://api.example.com/login", RequestError::Timeout);

    let (executor, _) = executor_for(collection, transport);
    let err = executor.send(&target, None).await.unwrap_err();

    assert_eq!(
        err,
        ChainError::Transport {
            request: "login".to_string(),
            source: RequestError::Timeout,
        }
    );
}

#[tokio::test]
async fn test_strict_mode_reports_missing_variables() {
    let mut collection = Collection::new("api", "API");
    let mut target = RequestDefinition::new("search", HttpMethod::GET, "{{baseUrl}}/search?q={{query}}")
        .with_auth(AuthScheme::Bearer {
            token: "{{token}}".to_string(),
        });
    target.collection_id = Some("api".to_string());
    collection.set_variable("baseUrl", "http://x");
    collection.add_request(target.clone());

    let transport = MockTransport::new();
    let (executor, _) = executor_for(collection, transport.clone());
    let executor = executor.with_options(ResolveOptions::default().strict());

    let err = executor.send(&target, None).await.unwrap_err();
    match err {
        ChainError::Resolve { request, source } => {
            assert_eq!(request, "search");
            assert_eq!(
                source,
                ResolveError::UnresolvedVariables(vec!["query".to_string(), "token".to_string()])
            );
        }
        other => panic!("expected resolve error, got {:?}", other),
    }
    assert!(transport.sent().is_empty());

    let overrides = VariableMap::from([
        ("query".to_string(), "rust".to_string()),
        ("token".to_string(), "t".to_string()),
    ]);
    executor.send(&target, Some(&overrides)).await.unwrap();
    assert_eq!(transport.sent_urls(), vec!["http://x/search?q=rust"]);
}

#[tokio::test]
async fn test_scope_precedence_through_send() {
    let mut collection = Collection::new("api", "API");
    collection.set_variable("X", "2");
    collection.add_request(RequestDefinition::new("probe", HttpMethod::GET, "http://x/{{X}}"));
    let target = request(&collection, "probe");

    let mut envs = Environments::new();
    let mut dev = Environment::new("dev");
    dev.set("X", "3");
    envs.add_environment(dev);
    let session = EnvironmentSession::new(envs);

    let mut store = InMemoryCollectionStore::new()
        .with_environments(session.clone())
        .with_defaults(VariableMap::from([("X".to_string(), "1".to_string())]));
    store.add_collection(collection);

    let transport = MockTransport::new();
    let (executor, _) = executor_over(store, transport.clone());

    executor.send(&target, None).await.unwrap();
    session.set_active_environment("dev").unwrap();
    executor.send(&target, None).await.unwrap();
    let overrides = VariableMap::from([("X".to_string(), "4".to_string())]);
    executor.send(&target, Some(&overrides)).await.unwrap();

    assert_eq!(
        transport.sent_urls(),
        vec!["http://x/2", "http://x/3", "http://x/4"]
    );
}

#[tokio::test]
async fn test_rerun_overwrites_stored_prerequisite() {
    let collection = login_collection();
    let target = request(&collection, "profile");
    let transport = MockTransport::new();
    transport.respond("https://api.example.com/login", 200, r#"{"data":{"token":"one"}}"#);

    let (executor, responses) = executor_for(collection, transport.clone());
    executor.send(&target, None).await.unwrap();

    transport.respond("https://api.example.com/login", 200, r#"{"data":{"token":"two"}}"#);
    executor.send(&target, None).await.unwrap();

    assert_eq!(transport.sent()[3].header("Authorization"), Some("Bearer two"));
    assert_eq!(
        responses.resolve_reference("login.response.body.data.token"),
        Some("two".to_string())
    );
}
