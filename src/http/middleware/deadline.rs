//! Per-request deadline enforcement.
//!
//! # Responsibilities
//! - Attach a [`RequestDeadline`] to every request
//! - Race the downstream chain against the deadline
//! - Answer with the deadline-exceeded envelope when the timer wins
//!
//! # Design Decisions
//! - The chain is polled before the timer, so a chain finishing in the same
//!   instant as the deadline keeps its response
//! - When the timer wins the chain future is dropped before the timeout
//!   response is built: async handlers are cancelled at their next await
//!   point and can never produce a second response
//! - Work detached from the request (spawned tasks, blocking pools) is not
//!   reclaimed; it should watch [`RequestDeadline::cancelled`]
//! - The cancellation token is released on every exit path through a drop
//!   guard, unwinding included
//! - The logger runs inside the raced chain and is dropped with it, so the
//!   timeout branch writes the exchange's status line and request metrics

use std::time::Duration;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::codes::Code;
use crate::error::AppError;
use crate::http::middleware::logger::{log_received, LogSettings};
use crate::http::response::EnvelopeBuilder;
use crate::observability::metrics;

/// Deadline and cancellation signal of one request.
///
/// Handlers can extract it to stop work early:
///
/// ```ignore
/// async fn report(deadline: RequestDeadline) -> Result<Reply, AppError> {
///     tokio::select! {
///         rows = build_report() => Ok(Reply::ok(rows)),
///         _ = deadline.cancelled() => Err(AppError::with_code(Code::CONTEXT_CANCELED, "report aborted")),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestDeadline {
    token: CancellationToken,
    expires_at: Instant,
}

impl RequestDeadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            expires_at: Instant::now() + timeout,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// True once the deadline instant has passed, whether or not the
    /// request was cancelled for another reason.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the request is cancelled: deadline expiry, completion,
    /// or client disconnect.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Child token for work detached from the request future.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

impl<S> FromRequestParts<S> for RequestDeadline
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestDeadline>()
            .cloned()
            .ok_or_else(|| AppError::internal("request deadline missing: deadline guard not installed"))
    }
}

/// State of the deadline stage.
#[derive(Debug, Clone)]
pub struct DeadlineGuard {
    timeout: Duration,
    envelopes: EnvelopeBuilder,
    log: LogSettings,
}

impl DeadlineGuard {
    pub fn new(timeout: Duration, envelopes: EnvelopeBuilder, log: LogSettings) -> Self {
        Self {
            timeout,
            envelopes,
            log,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Deadline stage.
pub async fn deadline_guard(
    State(guard): State<DeadlineGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = std::time::Instant::now();
    let frame = guard.envelopes.frame(&request);
    let deadline = RequestDeadline::after(guard.timeout);
    let _release = deadline.token.clone().drop_guard();
    request.extensions_mut().insert(deadline.clone());

    tokio::select! {
        biased;
        response = next.run(request) => response,
        _ = sleep_until(deadline.expires_at) => {
            deadline.token.cancel();

            tracing::warn!(
                request_id = %frame.context().request_id(),
                method = %frame.method(),
                uri = %frame.uri(),
                timeout_ms = guard.timeout.as_millis() as u64,
                "Request deadline exceeded"
            );
            metrics::record_timeout();

            let response = guard.envelopes.error(
                &frame,
                &AppError::with_code(Code::CONTEXT_DEADLINE_EXCEEDED, "Context Deadline Exceeded"),
            );
            log_received(
                guard.log,
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
