// tests/integration/http_prober_test.rs

//! Tests the HTTP prober against a real listener standing in for a daemon.

use super::test_helpers::init_tracing;
use axum::{Json, Router, http::StatusCode, routing::get};
use ringprobe::core::RingProbeError;
use ringprobe::topology::{DiscoveryOptions, HttpProber, TopologyCache, TopologyProber};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;

/// Serves a fixed hashring reply and returns the bound address.
async fn spawn_daemon(nodes: Vec<&'static str>) -> SocketAddr {
    let app = Router::new()
        .route(
            "/hashring/",
            get(move || {
                let nodes = nodes.clone();
                async move {
                    Json(json!({
                        "Name": "127.0.0.1",
                        "Nodes": nodes,
                        "Algo": "jump_fnv1a",
                        "Replicas": 2,
                    }))
                }
            }),
        )
        .route(
            "/broken/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/garbage/", get(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn prober(path: &str) -> HttpProber {
    HttpProber::new(Duration::from_secs(2), path).unwrap()
}

#[tokio::test]
async fn test_probe_decodes_hashring_reply() {
    let addr = spawn_daemon(vec!["127.0.0.1:a", "127.0.0.1:b"]).await;

    let snapshot = prober("/hashring/")
        .probe(&addr.to_string())
        .await
        .unwrap();

    assert_eq!(snapshot.name, "127.0.0.1");
    assert_eq!(snapshot.algorithm, "jump_fnv1a");
    assert_eq!(snapshot.replicas, 2);
    assert_eq!(snapshot.nodes, vec!["127.0.0.1:a", "127.0.0.1:b"]);
}

#[tokio::test]
async fn test_probe_rejects_error_status() {
    let addr = spawn_daemon(vec![]).await;

    let err = prober("/broken/").probe(&addr.to_string()).await.unwrap_err();

    match err {
        RingProbeError::Http(msg) => assert!(msg.contains("500"), "unexpected message: {msg}"),
        other => panic!("Expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_probe_rejects_malformed_body() {
    let addr = spawn_daemon(vec![]).await;

    let err = prober("/garbage/").probe(&addr.to_string()).await.unwrap_err();

    assert!(matches!(err, RingProbeError::Http(ref msg) if msg.contains("malformed")));
}

#[tokio::test]
async fn test_probe_of_closed_port_fails() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = prober("/hashring/").probe(&addr.to_string()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_discovery_over_http_single_daemon() {
    init_tracing();
    let addr = spawn_daemon(vec!["127.0.0.1:a", "127.0.0.1:b"]).await;
    let cache = TopologyCache::new(prober("/hashring/"), DiscoveryOptions::default());

    let cluster = cache.get_cluster_config(&addr.to_string()).await.unwrap();

    // Both instances live on the seed host, so there are no peers to disagree.
    assert!(cluster.is_healthy());
    assert_eq!(cluster.port(), addr.port().to_string());
    assert_eq!(cluster.hash_ring().len(), 2);
    assert_eq!(
        cluster.host_ports(),
        vec![addr.to_string(), addr.to_string()]
    );
}
