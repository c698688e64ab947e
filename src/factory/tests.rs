use super::*;
use crate::circuit::CircuitPolicy;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn get_rejects_unknown_service_name() {
    let factory = ClientFactory::new();
    let err = factory.get("not-a-service").unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::ValidationError);
}

#[test]
fn get_rejects_unconfigured_service() {
    let factory = ClientFactory::new();
    let err = factory.get("user").unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::ValidationError);
}

#[test]
fn get_memoizes_the_built_client() {
    let factory = ClientFactory::new().configure("user", ServiceConfig::new("https://user.example.com"));
    let first = factory.get("user").unwrap();
    let second = factory.get("user").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn configure_accepts_an_api_key() {
    use crate::utils::secure_key::SecureApiKey;

    let factory = ClientFactory::new().configure(
        "mpesa",
        ServiceConfig::new("https://mpesa.example.com").with_api_key(SecureApiKey::new("sk-mpesatoken123").unwrap()),
    );
    assert!(factory.get("mpesa").is_ok());
}

#[test]
fn construction_failure_is_not_memoized() {
    let factory = ClientFactory::new().configure("user", ServiceConfig::new("not a url"));
    assert!(factory.get("user").is_err());
    assert!(factory.get("user").is_err());
}

#[tokio::test]
async fn all_healthy_is_vacuously_true_with_no_configured_services() {
    let factory = ClientFactory::new();
    assert!(factory.all_healthy().await);
    assert!(factory.health_check().await.is_empty());
}

#[tokio::test]
async fn health_check_fans_out_across_configured_services() {
    let healthy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&healthy_server)
        .await;

    let unhealthy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&unhealthy_server)
        .await;

    let factory = ClientFactory::new()
        .configure(
            "user",
            ServiceConfig::new(healthy_server.uri()).with_retry_policy(RetryPolicy::new(
                1,
                Duration::from_millis(1),
                Duration::from_millis(1),
            )),
        )
        .configure(
            "driver",
            ServiceConfig::new(unhealthy_server.uri())
                .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(1), Duration::from_millis(1)))
                .with_circuit_policy(CircuitPolicy::named("driver")),
        );

    let reports = factory.health_check().await;
    assert_eq!(reports.len(), 2);
    assert!(!factory.all_healthy().await);

    let user_report = reports.iter().find(|r| r.name == "user").unwrap();
    assert!(user_report.healthy);
    assert!(user_report.error.is_none());

    let driver_report = reports.iter().find(|r| r.name == "driver").unwrap();
    assert!(!driver_report.healthy);
}
