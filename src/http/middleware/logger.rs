//! Request/response logging stage.
//!
//! Logs the inbound request line before dispatch and the status line after,
//! at `info` for statuses below 300 and `error` otherwise. Request metrics are
//! recorded whether or not the log lines are enabled.
//!
//! Responses produced outside this stage (deadline expiry, recovered panics)
//! drop the chain before its status line is written; the stages producing
//! them close the exchange through [`log_received`] instead.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::RequestContext;
use crate::observability::metrics;

/// Which lines the logger emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings {
    pub log_request: bool,
    pub log_response: bool,
}

pub async fn log_exchange(
    State(settings): State<LogSettings>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|context| context.request_id().to_string())
        .unwrap_or_default();

    if settings.log_request {
        tracing::info!(request_id = %request_id, uri = %uri, method = %method, "httpclient Sent Request");
    }

    let response = next.run(request).await;
    log_received(settings, &request_id, &method, &uri, response.status(), started);
    response
}

/// Close an exchange: status line plus request metrics.
pub(crate) fn log_received(
    settings: LogSettings,
    request_id: &str,
    method: &Method,
    uri: &str,
    status: StatusCode,
    started: Instant,
) {
    let status = status.as_u16();

    if settings.log_response {
        if status < 300 {
            tracing::info!(request_id = %request_id, uri = %uri, method = %method, resp_code = status, "httpclient Received Response");
        } else {
            tracing::error!(request_id = %request_id, uri = %uri, method = %method, resp_code = status, "httpclient Received Response");
        }
    }

    metrics::record_request(method.as_str(), status, started);
}
