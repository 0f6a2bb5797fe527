//! Integration tests module
//!
//! Shared fixtures: a scripted transport and builders for executors over an
//! in-memory collection store.

pub mod request_chaining_test;
pub mod template_resolution_test;
pub mod workspace_test;

use async_trait::async_trait;
use rest_chain::chain::PreRequestChainExecutor;
use rest_chain::collection::{Collection, InMemoryCollectionStore};
use rest_chain::executor::{RequestError, Transport};
use rest_chain::models::{HttpResponse, ResolvedRequest};
use rest_chain::store::ResponseStore;
use rest_chain::variables::VariableScopeResolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scripted reply for a URL.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: String },
    Fail(RequestError),
}

/// Transport answering from a URL table and recording every request.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    sent: Mutex<Vec<ResolvedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `url` with `status` and `body`.
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.replies.lock().unwrap().insert(
            url.to_string(),
            Reply::Respond {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Fails every exchange with `url`.
    pub fn fail(&self, url: &str, error: RequestError) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Fail(error));
    }

    /// Requests sent so far, in order.
    pub fn sent(&self) -> Vec<ResolvedRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// URLs sent so far, in order.
    pub fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, RequestError> {
        self.sent.lock().unwrap().push(request.clone());

        let reply = self.replies.lock().unwrap().get(&request.url).cloned();
        match reply {
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Respond { status, body }) => {
                let mut response = HttpResponse::new(status, if status < 400 { "OK" } else { "Error" });
                response.add_header("Content-Type", "application/json");
                response.set_body(body);
                Ok(response)
            }
            None => {
                let mut response = HttpResponse::new(200, "OK");
                response.set_body("{}");
                Ok(response)
            }
        }
    }
}

/// Builds an executor over `collection`, returning the shared response store.
pub fn executor_for(
    collection: Collection,
    transport: Arc<MockTransport>,
) -> (PreRequestChainExecutor, ResponseStore) {
    let mut store = InMemoryCollectionStore::new();
    store.add_collection(collection);
    executor_over(store, transport)
}

/// Builds an executor over a prepared collection store.
pub fn executor_over(
    store: InMemoryCollectionStore,
    transport: Arc<MockTransport>,
) -> (PreRequestChainExecutor, ResponseStore) {
    let responses = ResponseStore::new();
    let resolver = VariableScopeResolver::new(Arc::new(store), responses.clone());
    (PreRequestChainExecutor::new(resolver, transport), responses)
}
