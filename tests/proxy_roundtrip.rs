//! Orchestrator -> HTTP proxy -> stub provider, all over real sockets.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use restomap::api::HttpUpstream;
use restomap::config::{ApiKey, UpstreamConfig};
use restomap::domain::Coordinates;
use restomap::gateway::{PROXY_PATH, ProxyGateway, proxy_router};
use restomap::orchestrator::{HttpGateway, MapOptions, Orchestrator, SearchOutcome, SearchState};
use restomap::terminal::TerminalSurface;

const KEY: &str = "integration-key";

#[derive(Default)]
struct Provider {
    geocode_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

type Params = Query<HashMap<String, String>>;

fn denied() -> String {
    json!({ "status": "REQUEST_DENIED", "error_message": "bad key" }).to_string()
}

async fn geocode(State(provider): State<Arc<Provider>>, Query(params): Params) -> String {
    provider.geocode_calls.fetch_add(1, Ordering::SeqCst);
    if params.get("key").map(String::as_str) != Some(KEY) {
        return denied();
    }
    let body = match params.get("address").map(String::as_str) {
        Some("Vilnius") => json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 54.6872, "lng": 25.2797 } } }]
        }),
        _ => json!({ "status": "ZERO_RESULTS", "results": [] }),
    };
    body.to_string()
}

async fn text_search(State(provider): State<Arc<Provider>>, Query(params): Params) -> String {
    provider.search_calls.fetch_add(1, Ordering::SeqCst);
    if params.get("key").map(String::as_str) != Some(KEY) {
        return denied();
    }
    assert_eq!(
        params.get("query").map(String::as_str),
        Some("best rated restaurants in Vilnius")
    );
    assert!(params.contains_key("fields"));
    json!({
        "status": "OK",
        "results": [
            {
                "place_id": "p-low",
                "name": "Low",
                "rating": 3.5,
                "user_ratings_total": 10,
                "formatted_address": "Pilies g. 1",
                "geometry": { "location": { "lat": 54.68, "lng": 25.28 } }
            },
            {
                "place_id": "p-high",
                "name": "High",
                "rating": 4.8,
                "user_ratings_total": 900,
                "geometry": { "location": { "lat": 54.69, "lng": 25.27 } },
                "website": "https://high.example"
            },
            {
                "place_id": "p-none",
                "name": "Unrated"
            }
        ]
    })
    .to_string()
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn start_provider() -> (Arc<Provider>, SocketAddr) {
    let provider = Arc::new(Provider::default());
    let router = Router::new()
        .route("/geocode/json", get(geocode))
        .route("/place/textsearch/json", get(text_search))
        .with_state(provider.clone());
    (provider, spawn(router).await)
}

async fn start_proxy(provider: SocketAddr, key: Option<&str>) -> String {
    let endpoints = UpstreamConfig {
        geocode_url: format!("http://{}/geocode/json", provider),
        text_search_url: format!("http://{}/place/textsearch/json", provider),
        timeout_secs: 5,
    };
    let upstream = HttpUpstream::new(endpoints.timeout()).unwrap();
    let gateway = ProxyGateway::new(upstream, key.and_then(ApiKey::new), endpoints);
    let addr = spawn(proxy_router(Arc::new(gateway))).await;
    format!("http://{}{}", addr, PROXY_PATH)
}

fn surface() -> TerminalSurface<Vec<u8>> {
    TerminalSurface::new(MapOptions::default(), Vec::new())
}

fn gateway(proxy_url: String) -> HttpGateway {
    HttpGateway::new(proxy_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_renders_ranked_list_through_proxy() {
    let (provider, provider_addr) = start_provider().await;
    let proxy_url = start_proxy(provider_addr, Some(KEY)).await;

    let mut orchestrator = Orchestrator::new(surface(), "Vilnius");
    let outcome = orchestrator.search(&gateway(proxy_url), "Vilnius").await;

    assert_eq!(
        outcome,
        SearchOutcome::Rendered {
            places: 3,
            markers: 2
        }
    );
    assert_eq!(orchestrator.state(), SearchState::Rendered);
    let order: Vec<&str> = orchestrator
        .session()
        .rows()
        .iter()
        .map(|p| p.place_id.as_str())
        .collect();
    assert_eq!(order, ["p-high", "p-low", "p-none"]);
    assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);

    let surface = orchestrator.into_surface();
    assert_eq!(surface.center(), Coordinates::new(54.6872, 25.2797));
    assert_eq!(surface.zoom(), 13);

    let text = String::from_utf8(surface.into_inner()).unwrap();
    assert!(text.contains("  1. High  * 4.8 (900)"));
    assert!(text.contains("Visit site: https://high.example"));
    assert!(text.contains("  3. Unrated  * N/A (0)"));
}

#[tokio::test]
async fn test_unknown_city_stops_before_place_search() {
    let (provider, provider_addr) = start_provider().await;
    let proxy_url = start_proxy(provider_addr, Some(KEY)).await;

    let mut orchestrator = Orchestrator::new(surface(), "Vilnius");
    let outcome = orchestrator.search(&gateway(proxy_url), "Atlantis").await;

    match outcome {
        SearchOutcome::Failed(message) => {
            assert!(message.contains("ZERO_RESULTS"), "{}", message);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(orchestrator.state(), SearchState::Errored);
    assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_proxy_without_key_never_calls_provider() {
    let (provider, provider_addr) = start_provider().await;
    let proxy_url = start_proxy(provider_addr, None).await;

    let mut orchestrator = Orchestrator::new(surface(), "Vilnius");
    let outcome = orchestrator.search(&gateway(proxy_url), "Vilnius").await;

    match outcome {
        SearchOutcome::Failed(message) => {
            assert!(message.contains("API key is not configured"), "{}", message);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_proxy_rejects_missing_query() {
    let (_, provider_addr) = start_provider().await;
    let proxy_url = start_proxy(provider_addr, Some(KEY)).await;

    let response = reqwest::get(format!("{}?type=geocode", proxy_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing required parameters" }));
}

#[tokio::test]
async fn test_proxy_forwards_denied_key_as_forbidden() {
    let (_, provider_addr) = start_provider().await;
    let proxy_url = start_proxy(provider_addr, Some("wrong-key")).await;

    let response = reqwest::get(format!("{}?type=geocode&query=Vilnius", proxy_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "REQUEST_DENIED");
    assert_eq!(body["message"], "bad key");
}
