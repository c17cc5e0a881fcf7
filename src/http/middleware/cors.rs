//! CORS decision layer.
//!
//! Policy selection is configuration-driven; the allow/deny mechanics are
//! delegated to `tower-http`.

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{CorsConfig, CorsMode};

/// Build the CORS layer for the configured mode.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    match config.mode {
        CorsMode::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods([
                Method::HEAD,
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ]),
        CorsMode::Default => {
            // Wildcards are rejected by validation; never hand one to `AllowOrigin::list`.
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter(|origin| origin.as_str() != "*")
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::HEAD,
                    Method::OPTIONS,
                ])
                .allow_headers([ORIGIN, CONTENT_LENGTH, CONTENT_TYPE])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app(config: &CorsConfig) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(config))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .header("origin", origin)
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_allow_all() {
        let config = CorsConfig {
            mode: CorsMode::AllowAll,
            allowed_origins: Vec::new(),
        };
        let response = app(&config).oneshot(preflight("https://anywhere.test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_default_mode_allows_listed_origin_only() {
        let config = CorsConfig {
            mode: CorsMode::Default,
            allowed_origins: vec!["https://app.example.com".into(), "*".into()],
        };

        let response = app(&config).oneshot(preflight("https://app.example.com")).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://app.example.com"
        );

        let response = app(&config).oneshot(preflight("https://evil.test")).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
