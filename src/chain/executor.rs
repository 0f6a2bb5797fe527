//! Runs prerequisite chains and sends requests.

use super::error::ChainError;
use super::policy::{FailureDecision, FailureHandler, PrerequisiteFailurePolicy};
use super::ChainState;
use crate::auth::apply_authentication;
use crate::config::EngineConfig;
use crate::executor::{apply_default_headers, Transport};
use crate::models::request::{RequestDefinition, ResolvedRequest};
use crate::models::response::HttpResponse;
use crate::variables::{ResolveOptions, VariableMap, VariableScopeResolver};
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ChainFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ChainError>> + Send + 'a>>;

/// One executed prerequisite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteReport {
    /// Request id.
    pub id: String,
    /// Declared name, under which the response was stored.
    pub name: Option<String>,
    /// Response status.
    pub status: u16,
    /// How the chain proceeded after evaluating the response.
    pub decision: FailureDecision,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Response of the target request.
    pub response: HttpResponse,
    /// Prerequisites in execution order, deepest first.
    pub prerequisites: Vec<PrerequisiteReport>,
}

/// Executes a request's prerequisite chain bottom-up, then the request.
///
/// Each prerequisite is resolved, authenticated and sent; its response is
/// stored under its declared name before the next step resolves, so later
/// steps can reference it with `{{<name>.response...}}`.
pub struct PreRequestChainExecutor {
    resolver: VariableScopeResolver,
    transport: Arc<dyn Transport>,
    failure_handler: Arc<dyn FailureHandler>,
    options: ResolveOptions,
    store_target_response: bool,
    default_headers: HashMap<String, String>,
}

impl std::fmt::Debug for PreRequestChainExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreRequestChainExecutor")
            .field("resolver", &self.resolver)
            .field("options", &self.options)
            .field("store_target_response", &self.store_target_response)
            .finish_non_exhaustive()
    }
}

impl PreRequestChainExecutor {
    /// Creates an executor with default options: lenient resolution,
    /// abort on failed prerequisites, target responses stored.
    pub fn new(resolver: VariableScopeResolver, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver,
            transport,
            failure_handler: Arc::new(PrerequisiteFailurePolicy::Abort),
            options: ResolveOptions::default(),
            store_target_response: true,
            default_headers: HashMap::new(),
        }
    }

    /// Creates an executor configured from `config`.
    pub fn from_config(
        resolver: VariableScopeResolver,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        Self::new(resolver, transport)
            .with_failure_handler(Arc::new(config.prerequisite_failure_policy))
            .with_options(ResolveOptions::from_config(config))
            .with_store_target_response(config.store_target_response)
            .with_default_headers(config.default_headers.clone())
    }

    /// Replaces the handler consulted on non-2xx prerequisite responses.
    pub fn with_failure_handler(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.failure_handler = handler;
        self
    }

    /// Sets the resolution options used for every request.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether `send` stores the target response under its name.
    pub fn with_store_target_response(mut self, store: bool) -> Self {
        self.store_target_response = store;
        self
    }

    /// Headers added to every request that does not set them.
    pub fn with_default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    /// The scope resolver requests are resolved with.
    pub fn resolver(&self) -> &VariableScopeResolver {
        &self.resolver
    }

    /// Executes every prerequisite of `request`, deepest first.
    ///
    /// `request` itself is not sent. Cycles are detected before anything is
    /// sent.
    pub async fn run_prerequisites(
        &self,
        request: &RequestDefinition,
    ) -> Result<Vec<PrerequisiteReport>, ChainError> {
        let mut chain = Vec::new();
        let mut reports = Vec::new();

        let result = self.walk(request, &mut chain, &mut reports).await;
        if result.is_err() {
            self.transition(ChainState::Aborted, &request.id);
        }
        self.transition(ChainState::Idle, &request.id);
        result.map(|_| reports)
    }

    /// Runs the prerequisite chain, then resolves and sends `target`.
    pub async fn send(
        &self,
        target: &RequestDefinition,
        overrides: Option<&VariableMap>,
    ) -> Result<SendOutcome, ChainError> {
        let prerequisites = self.run_prerequisites(target).await?;

        let resolved = self.prepare(target, overrides)?;
        debug!("sending {} {}", resolved.method, resolved.url);
        let response =
            self.transport
                .execute(&resolved)
                .await
                .map_err(|source| ChainError::Transport {
                    request: target.display_name().to_string(),
                    source,
                })?;

        if self.store_target_response {
            self.store_response(target, &response);
        }

        Ok(SendOutcome {
            response,
            prerequisites,
        })
    }

    /// Resolves a request, projects its auth and adds default headers.
    pub fn prepare(
        &self,
        request: &RequestDefinition,
        overrides: Option<&VariableMap>,
    ) -> Result<ResolvedRequest, ChainError> {
        let mut resolved = self
            .resolver
            .resolve_request(request, overrides, self.options)
            .map_err(|source| ChainError::Resolve {
                request: request.display_name().to_string(),
                source,
            })?;

        apply_authentication(&mut resolved).map_err(|source| ChainError::Auth {
            request: request.display_name().to_string(),
            source,
        })?;
        apply_default_headers(&mut resolved, &self.default_headers);

        Ok(resolved)
    }

    fn walk<'a>(
        &'a self,
        request: &'a RequestDefinition,
        chain: &'a mut Vec<String>,
        reports: &'a mut Vec<PrerequisiteReport>,
    ) -> ChainFuture<'a> {
        Box::pin(async move {
            let Some(prerequisite_id) = request.prerequisite.as_deref() else {
                return Ok(());
            };

            chain.push(request.id.clone());
            if chain.iter().any(|id| id == prerequisite_id) {
                let mut cycle = chain.clone();
                cycle.push(prerequisite_id.to_string());
                return Err(ChainError::CyclicDependency(cycle));
            }

            self.transition(ChainState::ResolvingPrerequisite, prerequisite_id);
            let prerequisite = self
                .resolver
                .collections()
                .find_prerequisite(prerequisite_id)
                .ok_or_else(|| ChainError::PrerequisiteNotFound {
                    request: request.id.clone(),
                    prerequisite: prerequisite_id.to_string(),
                })?;

            self.walk(&prerequisite, chain, reports).await?;

            let report = self.execute_prerequisite(&prerequisite).await?;
            reports.push(report);

            chain.pop();
            Ok(())
        })
    }

    async fn execute_prerequisite(
        &self,
        prerequisite: &RequestDefinition,
    ) -> Result<PrerequisiteReport, ChainError> {
        let resolved = self.prepare(prerequisite, None)?;

        self.transition(ChainState::ExecutingPrerequisite, &prerequisite.id);
        let response = self.transport.execute(&resolved).await.map_err(|e| {
            ChainError::PrerequisiteExecution {
                request: prerequisite.display_name().to_string(),
                message: e.to_string(),
            }
        })?;

        self.store_response(prerequisite, &response);

        self.transition(ChainState::Evaluating, &prerequisite.id);
        let decision = if response.is_success() {
            FailureDecision::Continue
        } else {
            warn!(
                "prerequisite '{}' returned status {}",
                prerequisite.display_name(),
                response.status
            );
            self.failure_handler
                .on_prerequisite_failure(prerequisite, &response)
                .await
        };

        match decision {
            FailureDecision::Continue => {
                self.transition(ChainState::Continue, &prerequisite.id);
                Ok(PrerequisiteReport {
                    id: prerequisite.id.clone(),
                    name: prerequisite.name.clone(),
                    status: response.status,
                    decision,
                })
            }
            FailureDecision::Abort => Err(ChainError::PrerequisiteFailed {
                request: prerequisite.display_name().to_string(),
                status: response.status,
            }),
        }
    }

    fn store_response(&self, request: &RequestDefinition, response: &HttpResponse) {
        match &request.name {
            Some(name) => self.resolver.responses().store(name.clone(), response.clone()),
            None => warn!(
                "request '{}' has no name, its response is not stored",
                request.id
            ),
        }
    }

    fn transition(&self, state: ChainState, request_id: &str) {
        trace!("chain state -> {} ({})", state, request_id);
    }
}
