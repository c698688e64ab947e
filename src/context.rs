//! The ambient request context threaded through the pipeline: tracing IDs
//! and a cancellation token, nothing else.

use tokio_util::sync::CancellationToken;

/// Per-call context consulted only for header injection and cancellation.
///
/// The pipeline never reads anything else out of this; domain-level
/// context (auth, tenant, user) lives above this crate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Option<String>,
    correlation_id: Option<String>,
    cancel: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext {
            request_id: None,
            correlation_id: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// A context that is a child of this one, sharing the same
    /// cancellation token so cancelling the parent cancels the child.
    pub fn child(&self) -> Self {
        RequestContext {
            request_id: self.request_id.clone(),
            correlation_id: self.correlation_id.clone(),
            cancel: self.cancel.child_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_has_no_ids_and_is_not_cancelled() {
        let ctx = RequestContext::new();
        assert!(ctx.request_id().is_none());
        assert!(ctx.correlation_id().is_none());
        assert!(!ctx.cancellation().is_cancelled());
    }

    #[test]
    fn builder_methods_set_ids() {
        let ctx = RequestContext::new()
            .with_request_id("req-1")
            .with_correlation_id("corr-1");
        assert_eq!(ctx.request_id(), Some("req-1"));
        assert_eq!(ctx.correlation_id(), Some("corr-1"));
    }

    #[test]
    fn cancelling_parent_cancels_child_token() {
        let ctx = RequestContext::new();
        let child = ctx.child();
        ctx.cancellation().cancel();
        assert!(child.cancellation().is_cancelled());
    }
}
