//! Request-level error type and the result of compiling it.
//!
//! An [`AppError`] is what handlers and middleware return when a request
//! fails. It carries an optional taxonomy [`Code`] and the raw diagnostic
//! message. It never reaches the client as-is: the envelope stage compiles
//! it through the [`MessageCatalog`](crate::codes::MessageCatalog) into an
//! HTTP status and localized text.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;

use crate::codes::Code;

/// Error raised while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    code: Option<Code>,
    message: String,
}

impl AppError {
    /// Error without a taxonomy code; compiles to the internal-error entry.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Error carrying a taxonomy code.
    pub fn with_code(code: Code, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(Code::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(Code::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(Code::UNAUTHORIZED, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_code(Code::VALIDATION_ERROR, message)
    }

    /// Error for a response produced without an outcome (framework
    /// rejections, fallbacks), keyed by its HTTP status.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let code = match status {
            StatusCode::BAD_REQUEST => Code::BAD_REQUEST,
            StatusCode::UNAUTHORIZED => Code::UNAUTHORIZED,
            StatusCode::FORBIDDEN => Code::FORBIDDEN,
            StatusCode::NOT_FOUND => Code::NOT_FOUND,
            StatusCode::METHOD_NOT_ALLOWED => Code::METHOD_NOT_ALLOWED,
            StatusCode::REQUEST_TIMEOUT => Code::CONTEXT_DEADLINE_EXCEEDED,
            StatusCode::CONFLICT => Code::CONFLICT,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Code::UNMARSHAL_ERROR,
            StatusCode::UNPROCESSABLE_ENTITY => Code::VALIDATION_ERROR,
            StatusCode::TOO_MANY_REQUESTS => Code::TOO_MANY_REQUESTS,
            StatusCode::NOT_IMPLEMENTED => Code::NOT_IMPLEMENTED,
            StatusCode::SERVICE_UNAVAILABLE => Code::SERVICE_UNAVAILABLE,
            s if s.is_client_error() => Code::BAD_REQUEST,
            _ => Code::INTERNAL_SERVER_ERROR,
        };
        Self::with_code(code, message)
    }

    pub fn code(&self) -> Option<Code> {
        self.code
    }

    /// Raw diagnostic text, written to `metadata.error.message`.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

/// An error compiled for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledError {
    pub http_status: StatusCode,
    pub title: &'static str,
    pub body: &'static str,
    pub code: Code,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_message() {
        let err = AppError::with_code(Code::CONFLICT, "order 17 already settled");
        assert_eq!(err.to_string(), "order 17 already settled");
        assert_eq!(err.code(), Some(Code::CONFLICT));
    }

    #[test]
    fn test_uncoded_error() {
        let err = AppError::new("boom");
        assert_eq!(err.code(), None);
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_helpers_pick_codes() {
        assert_eq!(AppError::internal("x").code(), Some(Code::INTERNAL_SERVER_ERROR));
        assert_eq!(AppError::not_found("x").code(), Some(Code::NOT_FOUND));
        assert_eq!(AppError::unauthorized("x").code(), Some(Code::UNAUTHORIZED));
        assert_eq!(AppError::validation("x").code(), Some(Code::VALIDATION_ERROR));
    }

    #[test]
    fn test_from_status_keys_on_http_status() {
        let err = AppError::from_status(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        assert_eq!(err.code(), Some(Code::METHOD_NOT_ALLOWED));
        assert_eq!(
            AppError::from_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, "x").code(),
            Some(Code::UNMARSHAL_ERROR)
        );
        assert_eq!(AppError::from_status(StatusCode::GONE, "x").code(), Some(Code::BAD_REQUEST));
        assert_eq!(
            AppError::from_status(StatusCode::BAD_GATEWAY, "x").code(),
            Some(Code::INTERNAL_SERVER_ERROR)
        );
    }
}
