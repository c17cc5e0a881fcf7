//! Envelope stage: finalizes handler outcomes into response envelopes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::response::EnvelopeBuilder;

/// Captures the request frame, runs the handler and builds the envelope
/// from the outcome it returned.
pub async fn envelope_stage(
    State(envelopes): State<EnvelopeBuilder>,
    request: Request,
    next: Next,
) -> Response {
    let frame = envelopes.frame(&request);
    let response = next.run(request).await;
    envelopes.finalize(&frame, response).await
}
