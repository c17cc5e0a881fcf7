//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Service identity, also used for documentation.
    pub meta: MetaConfig,

    /// HTTP server and pipeline settings.
    pub server: ServerConfig,

    /// Log filtering.
    pub log: LogConfig,

    /// Metrics exporter settings.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetaConfig {
    pub title: String,
    pub description: String,

    /// Prefix of `metadata.path` in every envelope (e.g. "https://api.example.com").
    pub host: String,

    pub base_path: String,

    /// Service version attached to every request context.
    pub version: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            title: "REST Gateway".to_string(),
            description: String::new(),
            host: String::new(),
            base_path: "/".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Run mode, selects the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
    Test,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    pub mode: RunMode,

    /// Log every inbound request line.
    pub log_request: bool,

    /// Log every outbound status line.
    pub log_response: bool,

    /// Per-request deadline in milliseconds.
    pub request_timeout_ms: u64,

    pub cors: CorsConfig,

    /// Interactive API documentation route.
    pub swagger: OperatorRouteConfig,

    /// Effective-configuration diagnostics route.
    pub platform: OperatorRouteConfig,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            mode: RunMode::Debug,
            log_request: true,
            log_response: true,
            request_timeout_ms: 30_000,
            cors: CorsConfig::default(),
            swagger: OperatorRouteConfig::disabled("/swagger"),
            platform: OperatorRouteConfig::disabled("/platform"),
        }
    }
}

/// CORS policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorsMode {
    /// Any origin, any header.
    AllowAll,
    /// Only `allowed_origins`.
    #[default]
    Default,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub mode: CorsMode,
    pub allowed_origins: Vec<String>,
}

/// Basic-auth gated operator route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OperatorRouteConfig {
    pub enabled: bool,
    pub path: String,
    pub basic_auth: BasicAuthConfig,
}

impl OperatorRouteConfig {
    fn disabled(path: &str) -> Self {
        Self {
            enabled: false,
            path: path.to_string(),
            basic_auth: BasicAuthConfig::default(),
        }
    }
}

impl Default for OperatorRouteConfig {
    fn default() -> Self {
        Self::disabled("")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

/// Log filtering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Source of the effective runtime settings shown by the diagnostics route.
pub trait SettingsReader: Send + Sync {
    fn all_settings(&self) -> BTreeMap<String, serde_json::Value>;
}

impl SettingsReader for AppConfig {
    fn all_settings(&self) -> BTreeMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }
}
