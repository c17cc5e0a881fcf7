//! Context enrichment stage.
//!
//! # Responsibilities
//! - Derive the [`RequestContext`] and attach it to the request
//! - Run the rest of the chain inside a span carrying the request id
//!
//! # Design Decisions
//! - At most once per request: an existing context is never replaced
//! - Downstream stages only read the context

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::context::RequestContext;

/// State of the enrichment stage.
#[derive(Debug, Clone)]
pub struct Enricher {
    service_version: Arc<str>,
}

impl Enricher {
    pub fn new(service_version: impl Into<Arc<str>>) -> Self {
        Self {
            service_version: service_version.into(),
        }
    }
}

pub async fn enrich_context(
    State(enricher): State<Enricher>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match request.extensions().get::<RequestContext>() {
        Some(existing) => existing.clone(),
        None => {
            let context = RequestContext::from_headers(request.headers(), &enricher.service_version);
            request.extensions_mut().insert(context.clone());
            context
        }
    };

    let span = tracing::info_span!(
        "request",
        request_id = %context.request_id(),
        version = %context.service_version(),
    );
    next.run(request).instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    async fn echo_context(context: RequestContext) -> String {
        format!(
            "{}|{}|{}|{}",
            context.request_id(),
            context.user_agent(),
            context.accept_language(),
            context.service_version()
        )
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo_context))
            .layer(middleware::from_fn_with_state(Enricher::new("2.3.1"), enrich_context))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_context_available_to_handlers() {
        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "abc-123")
            .header("user-agent", "mobile/5.0")
            .header("accept-language", "id")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "abc-123|mobile/5.0|id|2.3.1");
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let text = body_text(response).await;

        let id = text.split('|').next().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert!(text.ends_with("||2.3.1"));
    }

    #[tokio::test]
    async fn test_existing_context_is_kept() {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(RequestContext::new("preset", "ua", "en", "0.0.1"));

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "preset|ua|en|0.0.1");
    }
}
