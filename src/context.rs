//! Request-scoped metadata.
//!
//! # Responsibilities
//! - Derive request id, user agent, locale and service version from a request
//! - Expose them to handlers through request extensions
//!
//! # Design Decisions
//! - Derived once per request by the enricher, read-only afterwards
//! - A missing or unusable request id header gets a fresh UUID v4
//! - Owned by the request; never shared across requests

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName};
use uuid::Uuid;

use crate::codes::Language;
use crate::error::AppError;

/// Request id header, read on the way in and echoed on the way out.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Metadata bag for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
    user_agent: String,
    accept_language: String,
    service_version: String,
}

impl RequestContext {
    pub fn new(
        request_id: impl Into<String>,
        user_agent: impl Into<String>,
        accept_language: impl Into<String>,
        service_version: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            user_agent: user_agent.into(),
            accept_language: accept_language.into(),
            service_version: service_version.into(),
        }
    }

    /// Derive the context from inbound headers.
    pub fn from_headers(headers: &HeaderMap, service_version: &str) -> Self {
        let request_id = header_str(headers, &X_REQUEST_ID)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            user_agent: header_str(headers, &header::USER_AGENT)
                .unwrap_or_default()
                .to_string(),
            accept_language: header_str(headers, &header::ACCEPT_LANGUAGE)
                .unwrap_or_default()
                .to_string(),
            service_version: service_version.to_string(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn accept_language(&self) -> &str {
        &self.accept_language
    }

    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    /// Best-effort language resolved from `Accept-Language`.
    pub fn language(&self) -> Language {
        Language::from_accept_language(&self.accept_language)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal("request context missing: enrichment stage not installed"))
    }
}
