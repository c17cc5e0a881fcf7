//! Inbound request id screening.
//!
//! Runs ahead of request-id assignment. A header that is blank or not valid
//! UTF-8 is removed so assignment replaces it with a fresh UUID, and every
//! later stage reads that one id from the header.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::context::X_REQUEST_ID;

pub async fn normalize_request_id(mut request: Request, next: Next) -> Response {
    let unusable = request
        .headers()
        .get(&X_REQUEST_ID)
        .is_some_and(|value| value.to_str().map_or(true, |id| id.trim().is_empty()));

    if unusable {
        tracing::debug!("Discarding unusable inbound request id");
        request.headers_mut().remove(&X_REQUEST_ID);
    }

    next.run(request).await
}
