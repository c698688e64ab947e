//! # Resilient Client Core
//!
//! A reusable request pipeline for internal service clients: exponential
//! backoff with jitter, a per-service circuit breaker, tracing-header
//! propagation, a closed HTTP error taxonomy, and a small factory that
//! wires the two together behind a fixed registry of named services.

pub mod circuit;
pub mod context;
pub mod error;
pub mod factory;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod service;
pub mod utils;

pub use circuit::{CircuitBreaker, CircuitPolicy, CircuitState, CircuitStats};
pub use context::RequestContext;
pub use error::{Error, ErrorKind, Result};
pub use factory::{ClientFactory, HealthReport, ServiceConfig, SERVICE_NAMES};
pub use pipeline::Pipeline;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use service::{EventPublisher, ServiceClient};
pub use utils::retry::RetryPolicy;
pub use utils::secure_key::SecureApiKey;

#[cfg(all(feature = "tls-rustls", feature = "tls-native-tls"))]
compile_error!("TLS features tls-rustls and tls-native-tls are mutually exclusive. Please choose only one.");
