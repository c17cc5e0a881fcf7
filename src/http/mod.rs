//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, pipeline order)
//!     → middleware/ (cors, request id, recovery, deadline, enrich, logger, envelope)
//!     → handlers.rs or a business route (returns Reply / AppError)
//!     → response.rs (envelope built from the parked outcome)
//!     → Send to client
//! ```

pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use envelope::{Message, Meta, MetaError, Pagination, ResponseEnvelope};
pub use middleware::RequestDeadline;
pub use response::{EnvelopeBuilder, Frame, Reply};
pub use server::{HttpServer, HttpServerBuilder, RouteError};
