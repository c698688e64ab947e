use super::*;
use crate::circuit::CircuitPolicy;

fn pipeline(base: &str) -> Pipeline {
    Pipeline::new(
        reqwest::Client::new(),
        Url::parse(base).unwrap(),
        "svc",
        RetryPolicy::default(),
        None,
    )
}

#[test]
fn build_url_joins_path_without_query() {
    let p = pipeline("https://api.example.com/v1/");
    let req = Request::new(Method::GET, "rides/42");
    let url = p.build_url(&req).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/rides/42");
}

#[test]
fn build_url_appends_encoded_query_params() {
    let p = pipeline("https://api.example.com/v1/");
    let req = Request::new(Method::GET, "rides").query("status", "en route");
    let url = p.build_url(&req).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/rides?status=en+route");
}

#[tokio::test]
async fn circuit_open_rejects_without_a_transport_call() {
    let circuit = Arc::new(CircuitBreaker::new(CircuitPolicy {
        failure_threshold: 1,
        success_threshold: 1,
        open_timeout: std::time::Duration::from_secs(30),
        max_concurrent_probes: 1,
        name: "svc".to_string(),
    }));
    circuit.record_failure();

    let pipeline = Pipeline::new(
        reqwest::Client::new(),
        Url::parse("https://api.example.com/v1/").unwrap(),
        "svc",
        RetryPolicy::default(),
        Some(circuit),
    );

    let ctx = RequestContext::new();
    let err = pipeline
        .do_request(&ctx, Request::new(Method::GET, "rides"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::CircuitOpen);
}

#[tokio::test]
async fn cancellation_before_any_attempt_yields_timeout() {
    let pipeline = pipeline("https://api.example.com/v1/");
    let ctx = RequestContext::new();
    ctx.cancellation().cancel();

    let err = pipeline
        .do_request(&ctx, Request::new(Method::GET, "rides"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::Timeout);
}
