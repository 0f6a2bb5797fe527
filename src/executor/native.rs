//! Native transport backed by reqwest.

use super::{RequestError, Transport};
use crate::config::EngineConfig;
use crate::models::request::{HttpMethod, ResolvedRequest};
use crate::models::response::HttpResponse;
use async_trait::async_trait;
use log::debug;
use std::time::Instant;
use url::Url;

/// [`Transport`] that sends requests with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport honoring the timeout, redirect and TLS settings.
    pub fn new(config: &EngineConfig) -> Result<Self, RequestError> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects as usize)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .build()
            .map_err(|e| RequestError::BuildError(e.to_string()))?;

        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::TRACE => reqwest::Method::TRACE,
        HttpMethod::CONNECT => reqwest::Method::CONNECT,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, RequestError> {
        let url = Url::parse(&request.url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RequestError::UnsupportedProtocol(url.scheme().to_string()));
        }

        let start = Instant::now();
        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;

        let status = response.status();
        let mut result = HttpResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
        );
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                result.append_header(name.as_str(), value);
            }
        }

        let bytes = response.bytes().await?;
        result.set_body(String::from_utf8_lossy(&bytes));
        result.time = start.elapsed().as_millis() as u64;

        debug!(
            "{} {} -> {} in {}ms",
            request.method, request.url, result.status, result.time
        );
        Ok(result)
    }
}
