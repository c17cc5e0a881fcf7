//! Shared utilities for integration testing.

use std::net::SocketAddr;

use rest_gateway::http::HttpServerBuilder;
use rest_gateway::{AppConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A gateway serving on an ephemeral local port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, reqwest::header::HeaderMap, serde_json::Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.json().await.unwrap();
        (status, headers, body)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the built-in routes only.
#[allow(dead_code)]
pub async fn start_gateway(config: AppConfig) -> TestGateway {
    start_with(HttpServer::builder(config)).await
}

/// Start a gateway from a prepared builder.
pub async fn start_with(builder: HttpServerBuilder) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = builder.build();
    let shutdown = Shutdown::new();
    let signal = shutdown.signalled();
    tokio::spawn(async move {
        server.run(listener, signal).await.unwrap();
    });

    TestGateway {
        addr,
        shutdown,
        client: reqwest::Client::new(),
    }
}

/// Config with a short deadline and quiet logs.
#[allow(dead_code)]
pub fn test_config(request_timeout_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.request_timeout_ms = request_timeout_ms;
    config.server.log_request = false;
    config.server.log_response = false;
    config.meta.host = "http://gateway.test".to_string();
    config
}
