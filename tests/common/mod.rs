//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response};
use qos_lab_api::observability::MemorySink;
use qos_lab_api::{LabConfig, LabServer, Shutdown};
use tokio::net::TcpListener;

pub const NODE_ID: &str = "node-test";

/// Default config with a recognisable node id and a small read default.
pub fn test_config() -> LabConfig {
    let mut config = LabConfig::default();
    config.node.node_id = NODE_ID.to_string();
    config.node.read_bytes_default = 4096;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Build an in-process server recording into memory.
#[allow(dead_code)]
pub fn test_server() -> (LabServer, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let server = LabServer::new(test_config(), sink.clone());
    (server, sink)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A node listening on an ephemeral port.
#[allow(dead_code)]
pub struct RunningNode {
    pub addr: SocketAddr,
    pub sink: Arc<MemorySink>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl RunningNode {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a real node on 127.0.0.1 with an OS-assigned port.
#[allow(dead_code)]
pub async fn start_node() -> RunningNode {
    let (server, sink) = test_server();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningNode { addr, sink, shutdown }
}

/// Client that never reuses connections between tests.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
