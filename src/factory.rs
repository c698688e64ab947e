//! Lazily instantiates, memoizes, and parallel-health-checks the closed
//! registry of named service clients.

use crate::circuit::{CircuitBreaker, CircuitPolicy};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::service::ServiceClient;
use crate::utils::retry::RetryPolicy;
use crate::utils::secure_key::SecureApiKey;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

/// The closed set of service names the factory knows how to construct.
pub const SERVICE_NAMES: &[&str] = &[
    "user", "driver", "ride", "payment", "pricing", "safety", "sms", "email", "mpesa", "push",
    "identity", "storage",
];

/// Per-service configuration consulted the first time that service is
/// accessed. An empty `base_url` means the service is not configured.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub overall_timeout: Duration,
    pub per_attempt_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub circuit_policy: Option<CircuitPolicy>,
    pub api_key: Option<SecureApiKey>,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ServiceConfig {
            base_url: base_url.into(),
            overall_timeout: Duration::from_secs(30),
            per_attempt_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            retry_policy: RetryPolicy::default(),
            circuit_policy: None,
            api_key: None,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_circuit_policy(mut self, circuit_policy: CircuitPolicy) -> Self {
        self.circuit_policy = Some(circuit_policy);
        self
    }

    /// Attaches a credential sent as `Authorization: Bearer <key>` on every
    /// outgoing call, unless the caller already set that header explicitly.
    pub fn with_api_key(mut self, api_key: SecureApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

/// One service's outcome from a fan-out health check.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub name: &'static str,
    pub healthy: bool,
    pub error: Option<String>,
}

/// Owns the fixed registry of named services and lazily builds each
/// wrapper on first access.
pub struct ClientFactory {
    configs: HashMap<&'static str, ServiceConfig>,
    clients: RwLock<HashMap<&'static str, Arc<ServiceClient>>>,
}

impl ClientFactory {
    pub fn new() -> Self {
        ClientFactory {
            configs: HashMap::new(),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Registers configuration for `name`. Panics if `name` is not one of
    /// [`SERVICE_NAMES`]; this is a programmer error caught at startup.
    pub fn configure(mut self, name: &'static str, config: ServiceConfig) -> Self {
        assert!(
            SERVICE_NAMES.contains(&name),
            "'{name}' is not a recognized service name"
        );
        self.configs.insert(name, config);
        self
    }

    fn build_pipeline(&self, name: &'static str) -> Result<Arc<Pipeline>> {
        let config = self
            .configs
            .get(name)
            .ok_or_else(|| Error::validation(format!("service '{name}' has no configuration")))?;

        if !config.is_configured() {
            return Err(Error::validation(format!(
                "service '{name}' has no base URL configured"
            )));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::validation(format!("invalid base URL for service '{name}': {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(config.overall_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()
            .map_err(|e| Error::validation(format!("failed to build HTTP client for service '{name}': {e}")))?;

        let circuit = config.circuit_policy.clone().map(|mut policy| {
            if policy.name.is_empty() {
                policy.name = name.to_string();
            }
            Arc::new(CircuitBreaker::new(policy))
        });

        let mut pipeline = Pipeline::new(client, base_url, name, config.retry_policy.clone(), circuit)
            .with_attempt_timeout(config.per_attempt_timeout);
        if let Some(api_key) = &config.api_key {
            pipeline = pipeline.with_api_key(api_key.clone());
        }

        Ok(Arc::new(pipeline))
    }

    /// Returns the memoized wrapper for `name`, building it on first
    /// access under a double-checked read/write lock. Construction
    /// failures are never memoized.
    pub fn get(&self, name: &'static str) -> Result<Arc<ServiceClient>> {
        if !SERVICE_NAMES.contains(&name) {
            return Err(Error::validation(format!("unknown service '{name}'")));
        }

        if let Some(client) = self.clients.read().unwrap().get(name) {
            return Ok(Arc::clone(client));
        }

        let mut clients = self.clients.write().unwrap();
        if let Some(client) = clients.get(name) {
            return Ok(Arc::clone(client));
        }

        let pipeline = self.build_pipeline(name)?;
        let client = Arc::new(ServiceClient::new(pipeline));
        clients.insert(name, Arc::clone(&client));
        Ok(client)
    }

    fn configured_names(&self) -> Vec<&'static str> {
        self.configs
            .iter()
            .filter(|(_, cfg)| cfg.is_configured())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Fans out a health probe to every configured service concurrently.
    pub async fn health_check(&self) -> Vec<HealthReport> {
        let checks = self.configured_names().into_iter().map(|name| async move {
            match self.get(name) {
                Ok(client) => match client.health_check(RequestContext::new()).await {
                    Ok(healthy) => HealthReport {
                        name,
                        healthy,
                        error: None,
                    },
                    Err(e) => HealthReport {
                        name,
                        healthy: false,
                        error: Some(e.message().to_string()),
                    },
                },
                Err(e) => HealthReport {
                    name,
                    healthy: false,
                    error: Some(e.message().to_string()),
                },
            }
        });
        join_all(checks).await
    }

    /// `true` iff every configured service reported healthy. Vacuously
    /// true when nothing is configured.
    pub async fn all_healthy(&self) -> bool {
        self.health_check().await.iter().all(|r| r.healthy)
    }
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "factory/tests.rs"]
mod tests;
