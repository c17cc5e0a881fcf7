//! Panic recovery stage.
//!
//! A panic anywhere below this stage is caught, logged with its payload and
//! turned into the generic internal-error envelope. The panic text never
//! reaches the client. The unwind skips the logger's status line, so this
//! stage writes it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::FutureExt;

use crate::error::AppError;
use crate::http::middleware::logger::{log_received, LogSettings};
use crate::http::response::EnvelopeBuilder;
use crate::observability::metrics;

/// Message exposed to clients for recovered panics.
pub const PANIC_MESSAGE: &str = "Internal Server Error";

/// State of the recovery stage.
#[derive(Debug, Clone)]
pub struct PanicRecovery {
    envelopes: EnvelopeBuilder,
    log: LogSettings,
}

impl PanicRecovery {
    pub fn new(envelopes: EnvelopeBuilder, log: LogSettings) -> Self {
        Self { envelopes, log }
    }
}

pub async fn recover_panics(
    State(recovery): State<PanicRecovery>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let frame = recovery.envelopes.frame(&request);

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(
                request_id = %frame.context().request_id(),
                method = %frame.method(),
                uri = %frame.uri(),
                panic = %panic_message(payload.as_ref()),
                "Recovered from panic while handling request"
            );
            metrics::record_panic();

            let response = recovery.envelopes.error(&frame, &AppError::internal(PANIC_MESSAGE));
            log_received(
                recovery.log,
                frame.context().request_id(),
                frame.method(),
                frame.uri(),
                response.status(),
                started,
            );
            response
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
