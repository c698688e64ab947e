//! The request execution pipeline: tracing-header injection, circuit
//! admission, the retry loop, and terminal classification.

use crate::circuit::CircuitBreaker;
use crate::context::RequestContext;
use crate::error::{is_retryable_status, Error, Result};
use crate::request::{Request, RequestBuilder};
use crate::response::Response;
use crate::utils::retry::{parse_retry_after, RetryPolicy};
use crate::utils::secure_key::SecureApiKey;
use crate::utils::url_builder::UrlBuilder;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// A single attempt's transport-level failure: either the underlying HTTP
/// client errored, or the per-attempt timeout elapsed first.
#[derive(Debug)]
enum TransportFailure {
    Reqwest(reqwest::Error),
    AttemptTimeout(Duration),
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Reqwest(e) => write!(f, "{e}"),
            TransportFailure::AttemptTimeout(d) => write!(f, "attempt timed out after {d:?}"),
        }
    }
}

impl std::error::Error for TransportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportFailure::Reqwest(e) => Some(e),
            TransportFailure::AttemptTimeout(_) => None,
        }
    }
}

enum Attempt {
    Cancelled,
    Transport(std::result::Result<(u16, HeaderMap, Vec<u8>), TransportFailure>),
}

/// Orchestrates one service's outbound calls: builds the URL, admits
/// through the circuit breaker, retries transient failures, and reports
/// outcomes back to the breaker.
pub struct Pipeline {
    client: reqwest::Client,
    url_builder: UrlBuilder,
    service_name: String,
    retry_policy: RetryPolicy,
    circuit: Option<Arc<CircuitBreaker>>,
    attempt_timeout: Duration,
    api_key: Option<SecureApiKey>,
}

impl Pipeline {
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        service_name: impl Into<String>,
        retry_policy: RetryPolicy,
        circuit: Option<Arc<CircuitBreaker>>,
    ) -> Self {
        Pipeline {
            client,
            url_builder: UrlBuilder::new(base_url),
            service_name: service_name.into(),
            retry_policy,
            circuit,
            attempt_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }

    /// Overrides the per-attempt timeout (default 10s).
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Attaches a credential sent as `Authorization: Bearer <key>` on every
    /// outgoing call, unless the caller already set that header explicitly.
    pub fn with_api_key(mut self, api_key: SecureApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Starts a fluent request bound to this pipeline.
    pub fn request(self: &Arc<Self>, ctx: RequestContext, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Arc::clone(self), ctx, method, path)
    }

    fn build_url(&self, request: &Request) -> Result<Url> {
        let mut url = self.url_builder.build(&request.path)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn record_success(&self) {
        if let Some(circuit) = &self.circuit {
            circuit.record_success();
        }
    }

    fn record_failure(&self) {
        if let Some(circuit) = &self.circuit {
            circuit.record_failure();
        }
    }

    async fn send_once(
        &self,
        url: &Url,
        request: &Request,
        ctx: &RequestContext,
    ) -> std::result::Result<(u16, HeaderMap, Vec<u8>), TransportFailure> {
        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(request_id) = ctx.request_id() {
            builder = builder.header("X-Request-ID", request_id);
        }
        if let Some(correlation_id) = ctx.correlation_id() {
            builder = builder.header("X-Correlation-ID", correlation_id);
        }
        if let Some(api_key) = &self.api_key {
            if !request.headers.contains_key(AUTHORIZATION) {
                builder = builder.header(AUTHORIZATION, api_key.bearer_header_value());
            }
        }

        let call = async {
            let response = builder.send().await.map_err(TransportFailure::Reqwest)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(TransportFailure::Reqwest)?
                .to_vec();
            Ok((status, headers, body))
        };

        match tokio::time::timeout(self.attempt_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportFailure::AttemptTimeout(self.attempt_timeout)),
        }
    }

    /// Runs `request` through admission, retry, and classification.
    pub async fn do_request(&self, ctx: &RequestContext, request: Request) -> Result<Response> {
        let start = Instant::now();
        debug!(
            service = %self.service_name,
            method = %request.method,
            path = %request.path,
            "request starting"
        );

        if let Some(circuit) = &self.circuit {
            if !circuit.allow() {
                warn!(service = %self.service_name, "circuit open, rejecting request");
                return Err(Error::circuit_open(&self.service_name));
            }
        }

        let url = self.build_url(&request)?;
        let mut attempt: u32 = 0;

        loop {
            if ctx.cancellation().is_cancelled() {
                return Err(Error::timeout(format!(
                    "request to {} cancelled before attempt",
                    self.service_name
                )));
            }

            let outcome = tokio::select! {
                biased;
                _ = ctx.cancellation().cancelled() => Attempt::Cancelled,
                result = self.send_once(&url, &request, ctx) => Attempt::Transport(result),
            };

            match outcome {
                Attempt::Cancelled => {
                    return Err(Error::timeout(format!(
                        "request to {} cancelled mid-attempt",
                        self.service_name
                    )));
                }

                Attempt::Transport(Err(transport_err)) => {
                    if self.retry_policy.should_retry(attempt + 1, true) {
                        attempt += 1;
                        let wait = self.retry_policy.wait_duration(attempt, None);
                        debug!(
                            service = %self.service_name,
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "retrying after transport error: {transport_err}"
                        );
                        if !self.retry_policy.wait(wait, ctx.cancellation()).await {
                            return Err(Error::timeout(format!(
                                "request to {} cancelled during backoff",
                                self.service_name
                            ))
                            .with_source(transport_err));
                        }
                        continue;
                    }

                    self.record_failure();
                    warn!(service = %self.service_name, "request failed: {transport_err}");
                    return Err(Error::timeout(format!(
                        "transport error calling {}",
                        self.service_name
                    ))
                    .with_source(transport_err));
                }

                Attempt::Transport(Ok((status, headers, body))) => {
                    if is_retryable_status(status) && self.retry_policy.should_retry(attempt + 1, true) {
                        attempt += 1;
                        let retry_after = parse_retry_after(&headers);
                        let wait = self.retry_policy.wait_duration(attempt, retry_after);
                        debug!(
                            service = %self.service_name,
                            attempt,
                            status,
                            wait_ms = wait.as_millis() as u64,
                            "retrying after status"
                        );
                        if !self.retry_policy.wait(wait, ctx.cancellation()).await {
                            return Err(Error::timeout(format!(
                                "request to {} cancelled during backoff",
                                self.service_name
                            )));
                        }
                        continue;
                    }

                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    if status < 500 {
                        self.record_success();
                        if status >= 400 {
                            warn!(service = %self.service_name, status, elapsed_ms, "request completed with client error");
                        } else {
                            debug!(service = %self.service_name, status, elapsed_ms, "request completed");
                        }
                    } else {
                        self.record_failure();
                        warn!(service = %self.service_name, status, elapsed_ms, "request completed with server error");
                    }

                    return Ok(Response::new(status, headers, body));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline/tests.rs"]
mod tests;
