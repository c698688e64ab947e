use super::*;
use crate::utils::retry::RetryPolicy;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base: &str) -> ServiceClient {
    let pipeline = Arc::new(Pipeline::new(
        reqwest::Client::new(),
        Url::parse(base).unwrap(),
        "svc",
        RetryPolicy::new(1, std::time::Duration::from_millis(1), std::time::Duration::from_millis(1)),
        None,
    ));
    ServiceClient::new(pipeline)
}

#[tokio::test]
async fn health_check_true_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let healthy = client.health_check(RequestContext::new()).await.unwrap();
    assert!(healthy);
}

#[tokio::test]
async fn health_check_false_on_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let healthy = client.health_check(RequestContext::new()).await.unwrap();
    assert!(!healthy);
}
