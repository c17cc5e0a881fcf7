//! REST gateway request spine.
//!
//! Every response leaving the gateway is a uniform JSON envelope, every
//! request carries a correlation context and a deadline, and every error is
//! compiled from a numeric code into a localized message.

// Request model
pub mod codes;
pub mod context;
pub mod error;

// Pipeline and server
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use codes::{Code, Language, MessageCatalog};
pub use config::AppConfig;
pub use context::RequestContext;
pub use error::AppError;
pub use http::{HttpServer, Reply, RequestDeadline};
pub use lifecycle::Shutdown;
