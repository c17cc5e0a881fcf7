//! Request pipeline stages.
//!
//! # Order (outermost first)
//! ```text
//! cors → request id screening → request id → recovery → deadline → enrich → logger → envelope → handler
//! ```
//!
//! Each stage is a plain `axum::middleware` function except CORS and
//! request-id assignment, which come from `tower-http`.

pub mod basic_auth;
pub mod cors;
pub mod deadline;
pub mod enrich;
pub mod envelope;
pub mod logger;
pub mod recovery;
pub mod request_id;

pub use basic_auth::{require_basic_auth, BasicAuth};
pub use cors::cors_layer;
pub use deadline::{deadline_guard, DeadlineGuard, RequestDeadline};
pub use enrich::{enrich_context, Enricher};
pub use envelope::envelope_stage;
pub use logger::{log_exchange, LogSettings};
pub use recovery::{recover_panics, PanicRecovery};
pub use request_id::normalize_request_id;
