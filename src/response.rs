//! Immutable snapshot of a completed HTTP response.

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;

/// A fully buffered HTTP response: status, headers, and body bytes.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Response {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Returns the first header value for `key`, case-insensitive.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// JSON-decodes the body into `T`, refusing non-success responses.
    ///
    /// An empty body on a success response decodes to `Ok(None)`. Decode
    /// failures are wrapped as `BadGateway` rather than retried: a 2xx with
    /// an unparsable body is not a transient fault.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.is_success() {
            return Err(Error::map_http_status(self.status, &self.body));
        }
        if self.body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| Error::bad_gateway(format!("failed to decode response body: {e}")).with_source(e))
    }
}
