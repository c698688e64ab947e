//! Request data and its fluent builder.

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::response::Response;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::sync::Arc;

/// One fully-specified outbound call, ready for the pipeline.
///
/// Built fluently and consumed once by [`Pipeline::do_request`]; the
/// pipeline clones the body for each retry attempt.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Appends a query parameter; repeated keys are preserved in order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a header, overwriting any prior value for the same name.
    pub fn header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(key)
            .map_err(|e| Error::validation(format!("invalid header name '{key}': {e}")))?;
        let val = HeaderValue::try_from(value)
            .map_err(|e| Error::validation(format!("invalid header value for '{key}': {e}")))?;
        self.headers.insert(name, val);
        Ok(self)
    }

    /// Serializes `body` as JSON and sets `Content-Type: application/json`
    /// unless the caller already set a `Content-Type`.
    pub fn json_body<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::validation(format!("failed to serialize request body: {e}")))?;
        self.body = Some(bytes);
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(self)
    }

    fn finalize(mut self) -> Self {
        if !self.headers.contains_key(ACCEPT) {
            self.headers
                .insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        self
    }
}

/// Fluent construction of a [`Request`] bound to the pipeline that will
/// execute it.
pub struct RequestBuilder {
    pipeline: Arc<Pipeline>,
    ctx: RequestContext,
    request: Request,
}

impl RequestBuilder {
    pub fn new(pipeline: Arc<Pipeline>, ctx: RequestContext, method: Method, path: impl Into<String>) -> Self {
        RequestBuilder {
            pipeline,
            ctx,
            request: Request::new(method, path),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Result<Self> {
        self.request = self.request.header(key, value)?;
        Ok(self)
    }

    pub fn json_body<T: serde::Serialize>(mut self, body: &T) -> Result<Self> {
        self.request = self.request.json_body(body)?;
        Ok(self)
    }

    /// Sends the request through the pipeline.
    pub async fn send(self) -> Result<Response> {
        let request = self.request.finalize();
        self.pipeline.do_request(&self.ctx, request).await
    }

    /// Shorthand for `send()` followed by [`Response::decode`].
    pub async fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Option<T>> {
        self.send().await?.decode()
    }
}
