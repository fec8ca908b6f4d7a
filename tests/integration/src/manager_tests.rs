//! Config manager scenarios against local mock upstreams.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use gateway_control_plane::prelude::*;
use serde_json::Value;

const BOOKSTORE: &str = "endpoints.examples.bookstore.Bookstore";
const PROJECT: &str = "bookstore.endpoints.project123.cloud.goog";
const FAKE_JWKS: &str = "FAKEJWKS";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();
}

/// Mutable upstream state the mock Service Management server reads on
/// every request, so tests can swap documents mid-flight.
#[derive(Debug, Default)]
struct Upstream {
    configs: HashMap<String, String>,
    rollouts: String,
}

type SharedUpstream = Arc<RwLock<Upstream>>;

async fn service_management(State(state): State<SharedUpstream>, uri: Uri) -> (StatusCode, String) {
    let path = uri.path();
    let state = state.read().expect("upstream lock poisoned");

    if path.ends_with("/rollouts") {
        return (StatusCode::OK, state.rollouts.clone());
    }

    let config_id = path.rsplit('/').next().unwrap_or_default();
    match state.configs.get(config_id) {
        Some(body) => (StatusCode::OK, body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server runs");
    });
    format!("http://{addr}")
}

async fn serve_upstream(upstream: SharedUpstream) -> String {
    serve(
        Router::new()
            .fallback(service_management)
            .with_state(upstream),
    )
    .await
}

async fn serve_jwks() -> String {
    serve(Router::new().fallback(|| async { FAKE_JWKS.to_string() })).await
}

fn options_for(base_url: &str, strategy: RolloutStrategy) -> ManagerOptions {
    let mut options = ManagerOptions::new(GeneratorOptions::new(BackendProtocol::Grpc));
    options.service_management_url = base_url.to_string();
    options.rollout_strategy = strategy;
    options.check_rollout_interval = Duration::from_millis(100);
    options.fetch_timeout = Duration::from_secs(2);
    options
}

fn simple_config(config_id: &str) -> String {
    format!(
        r#"{{
            "name": "{PROJECT}",
            "title": "Endpoints Example",
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "id": "{config_id}"
        }}"#
    )
}

fn rollout_listing(entries: &[(&str, &[(&str, u64)])]) -> String {
    let rollouts: Vec<Value> = entries
        .iter()
        .map(|(rollout_id, percentages)| {
            let percentages: serde_json::Map<String, Value> = percentages
                .iter()
                .map(|(id, weight)| (id.to_string(), Value::from(*weight)))
                .collect();
            serde_json::json!({
                "rolloutId": rollout_id,
                "createTime": "2018-12-05T19:07:18.438Z",
                "status": "SUCCESS",
                "trafficPercentStrategy": {"percentages": percentages},
                "serviceName": PROJECT
            })
        })
        .collect();
    serde_json::json!({"rollouts": rollouts}).to_string()
}

fn decode_resource(resource: &BoxResource) -> Value {
    serde_json::from_slice(&resource.encode().expect("encodes").value).expect("payload is JSON")
}

#[tokio::test]
async fn fixed_strategy_publishes_the_initial_config() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    upstream
        .write()
        .expect("upstream lock")
        .configs
        .insert("2017-05-01r0".to_string(), simple_config("2017-05-01r0"));
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let manager = ConfigManager::new(
        PROJECT,
        "2017-05-01r0",
        options_for(&base_url, RolloutStrategy::Fixed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .expect("initial cycle succeeds");

    assert_eq!(manager.current_config_id(), "2017-05-01r0");
    assert_eq!(manager.current_rollout_id(), "");

    let cache = manager.cache();
    let request = DiscoveryRequest::new("api_proxy", TypeUrl::Listener);
    let response = cache.fetch(&request).expect("listener snapshot");

    assert_eq!(response.version, "2017-05-01r0");
    assert_eq!(response.request, request);
    assert_eq!(response.resources.len(), 1);

    let listener: Value =
        serde_json::from_slice(&response.resources[0].value).expect("listener JSON");
    assert_eq!(
        listener["filterChains"][0]["filters"][0]["name"],
        "envoy.http_connection_manager"
    );

    let clusters = cache
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Cluster))
        .expect("cluster snapshot");
    let cluster: Value =
        serde_json::from_slice(&clusters.resources[0].value).expect("cluster JSON");
    assert_eq!(cluster["name"], BOOKSTORE);

    // Routes are embedded in the listener; the snapshot does not carry
    // the type separately.
    let err = cache
        .fetch(&DiscoveryRequest::new(
            "api_proxy",
            TypeUrl::RouteConfiguration,
        ))
        .unwrap_err();
    assert!(matches!(err, GatewayError::SnapshotMissing { .. }));
}

#[tokio::test]
async fn jwks_documents_are_inlined_from_their_uris() {
    init_tracing();

    let jwks_url = serve_jwks().await;
    let config = format!(
        r#"{{
            "name": "{PROJECT}",
            "id": "2017-05-01r0",
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "authentication": {{
                "providers": [
                    {{
                        "id": "firebase",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "{jwks_url}/keys"
                    }}
                ],
                "rules": [
                    {{
                        "selector": "{BOOKSTORE}.CreateShelf",
                        "requirements": [{{"provider_id": "firebase"}}]
                    }}
                ]
            }}
        }}"#
    );

    let upstream: SharedUpstream = Arc::default();
    upstream
        .write()
        .expect("upstream lock")
        .configs
        .insert("2017-05-01r0".to_string(), config);
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let manager = ConfigManager::new(
        PROJECT,
        "2017-05-01r0",
        options_for(&base_url, RolloutStrategy::Fixed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .expect("initial cycle succeeds");

    let response = manager
        .cache()
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Listener))
        .expect("listener snapshot");
    let listener: Value =
        serde_json::from_slice(&response.resources[0].value).expect("listener JSON");

    let jwt = &listener["filterChains"][0]["filters"][0]["config"]["http_filters"][0];
    assert_eq!(jwt["name"], "envoy.filters.http.jwt_authn");
    assert_eq!(
        jwt["config"]["providers"]["firebase"]["local_jwks"]["inline_string"],
        FAKE_JWKS
    );
}

#[tokio::test]
async fn managed_strategy_follows_the_latest_rollout() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    {
        let mut state = upstream.write().expect("upstream lock");
        state
            .configs
            .insert("2018-12-05r0".to_string(), simple_config("2018-12-05r0"));
        state
            .configs
            .insert("2018-12-05r1".to_string(), simple_config("2018-12-05r1"));
        state.rollouts = rollout_listing(&[("2018-12-05r0", &[("2018-12-05r0", 100)])]);
    }
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let manager = ConfigManager::new(
        PROJECT,
        "2018-12-05r0",
        options_for(&base_url, RolloutStrategy::Managed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .expect("initial cycle succeeds");

    assert_eq!(manager.current_config_id(), "2018-12-05r0");
    assert_eq!(manager.current_rollout_id(), "2018-12-05r0");

    let cache = manager.cache();
    let request = DiscoveryRequest::new("api_proxy", TypeUrl::Listener);
    let response = cache.fetch(&request).expect("listener snapshot");
    assert_eq!(response.version, "2018-12-05r0");
    assert_eq!(response.request, request);

    // A new rollout shifts most traffic to r1; latest-wins picks it up
    // on the next tick.
    upstream.write().expect("upstream lock").rollouts = rollout_listing(&[
        (
            "2018-12-05r1",
            &[("2018-12-05r0", 40), ("2018-12-05r1", 60)],
        ),
        ("2018-12-05r0", &[("2018-12-05r0", 100)]),
    ]);

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(manager.current_config_id(), "2018-12-05r1");
    assert_eq!(manager.current_rollout_id(), "2018-12-05r1");

    let response = cache.fetch(&request).expect("listener snapshot");
    assert_eq!(response.version, "2018-12-05r1");
    assert_eq!(response.request, request);
}

#[tokio::test]
async fn managed_startup_without_success_rollouts_is_fatal() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    upstream.write().expect("upstream lock").rollouts = r#"{"rollouts": []}"#.to_string();
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let err = ConfigManager::new(
        PROJECT,
        "2018-12-05r0",
        options_for(&base_url, RolloutStrategy::Managed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, GatewayError::RolloutResolution { .. }));
}

#[tokio::test]
async fn fixed_startup_with_a_missing_config_is_fatal() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let err = ConfigManager::new(
        PROJECT,
        "2017-05-01r0",
        options_for(&base_url, RolloutStrategy::Fixed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, GatewayError::FetchFailure { .. }));
}

#[tokio::test]
async fn refresh_failure_keeps_the_current_snapshot() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    {
        let mut state = upstream.write().expect("upstream lock");
        state
            .configs
            .insert("2018-12-05r0".to_string(), simple_config("2018-12-05r0"));
        state.rollouts = rollout_listing(&[("2018-12-05r0", &[("2018-12-05r0", 100)])]);
    }
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let manager = ConfigManager::new(
        PROJECT,
        "2018-12-05r0",
        options_for(&base_url, RolloutStrategy::Managed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .expect("initial cycle succeeds");

    // The new rollout points at a config the endpoint cannot serve; the
    // cycle drops and the old snapshot stays active.
    upstream.write().expect("upstream lock").rollouts =
        rollout_listing(&[("2018-12-05r9", &[("2018-12-05r9", 100)])]);

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(manager.current_config_id(), "2018-12-05r0");
    let response = manager
        .cache()
        .fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Listener))
        .expect("snapshot still present");
    assert_eq!(response.version, "2018-12-05r0");
}

#[tokio::test]
async fn resources_decode_back_to_their_model() {
    init_tracing();

    let upstream: SharedUpstream = Arc::default();
    upstream
        .write()
        .expect("upstream lock")
        .configs
        .insert("2017-05-01r0".to_string(), simple_config("2017-05-01r0"));
    let base_url = serve_upstream(Arc::clone(&upstream)).await;

    let manager = ConfigManager::new(
        PROJECT,
        "2017-05-01r0",
        options_for(&base_url, RolloutStrategy::Fixed),
        TokenSource::fixed("ya29.test"),
    )
    .await
    .expect("initial cycle succeeds");

    let snapshot = manager
        .cache()
        .get_snapshot(NodeHash::from_id("api_proxy"))
        .expect("published");
    let clusters = snapshot.resources(TypeUrl::Cluster).expect("clusters");
    assert_eq!(decode_resource(&clusters[0])["type"], "STRICT_DNS");
}
