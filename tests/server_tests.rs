//! End-to-end tests against a server bound to a real TCP port.

use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::Value;
use voices_cache::{api::create_router, AppState, Config};

async fn spawn_server(config: Config) -> SocketAddr {
    let state = AppState::from_config(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_cache_round_trip_over_http() {
    let addr = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/voiceovers?group=commercial", addr);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.headers()["x-cache"], "HIT");

    let cleared: Value = client
        .post(format!("http://{}/cache/clear", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["message"], "Cache cleared successfully");

    let third = client.get(&url).send().await.unwrap();
    assert_eq!(third.headers()["x-cache"], "MISS");

    let metrics: Value = client
        .get(format!("http://{}/cache/metrics", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["stats"]["hits"], 1);
    assert_eq!(metrics["stats"]["size"], 1);
}

#[tokio::test]
async fn test_metrics_rate_limit_over_http() {
    let config = Config {
        metrics_rate_limit: 2,
        ..Config::default()
    };
    let addr = spawn_server(config).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/cache/metrics", addr);

    for _ in 0..2 {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = client.get(&url).send().await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = limited.json().await.unwrap();
    assert!(body["details"].as_str().unwrap().starts_with("retry after"));
}
