//! The generic per-service wrapper and the event-publishing capability a
//! payment-style wrapper depends on.

use crate::context::RequestContext;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::request::RequestBuilder;
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

/// A narrow capability for publishing a domain event under a partition
/// key. Kafka envelope construction and topic routing are external
/// collaborators; this crate only defines the contract a wrapper depends
/// on.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: serde_json::Value, key: &str) -> Result<()>;
}

/// Generic client shared by every named service wrapper.
///
/// Concrete per-service request/response schemas live outside this crate;
/// callers build their own domain methods on top of
/// [`ServiceClient::request`] and [`ServiceClient::health_check`].
pub struct ServiceClient {
    pipeline: Arc<Pipeline>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl ServiceClient {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        ServiceClient {
            pipeline,
            publisher: None,
        }
    }

    /// Builds a `payment`-style wrapper carrying an event-publishing
    /// capability.
    pub fn with_event_publisher(pipeline: Arc<Pipeline>, publisher: Arc<dyn EventPublisher>) -> Self {
        ServiceClient {
            pipeline,
            publisher: Some(publisher),
        }
    }

    pub fn name(&self) -> &str {
        self.pipeline.service_name()
    }

    pub fn publisher(&self) -> Option<&Arc<dyn EventPublisher>> {
        self.publisher.as_ref()
    }

    /// Starts a fluent request against this service.
    pub fn request(&self, ctx: RequestContext, method: Method, path: impl Into<String>) -> RequestBuilder {
        self.pipeline.request(ctx, method, path)
    }

    /// `GET /health`; healthy iff the response status is exactly 200.
    pub async fn health_check(&self, ctx: RequestContext) -> Result<bool> {
        let response = self.pipeline.request(ctx, Method::GET, "health").send().await?;
        Ok(response.status() == 200)
    }
}

#[cfg(test)]
#[path = "service/tests.rs"]
mod tests;
