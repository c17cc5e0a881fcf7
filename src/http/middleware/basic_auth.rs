//! Basic-auth gate for operator routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use crate::config::BasicAuthConfig;
use crate::error::AppError;

const REALM: &str = "Basic realm=\"Restricted\"";

/// Single account allowed through the gate.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: Arc<str>,
    password: Arc<str>,
}

impl BasicAuth {
    pub fn new(username: impl Into<Arc<str>>, password: impl Into<Arc<str>>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// True when the `Authorization` header carries this account.
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        let Some(encoded) = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Basic "))
        else {
            return false;
        };

        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(credentials) = String::from_utf8(decoded) else {
            return false;
        };

        let Some((user, pass)) = credentials.split_once(':') else {
            return false;
        };

        // Both fields are always compared; timing must not reveal which one failed.
        let user_ok = user.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = pass.as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

impl From<&BasicAuthConfig> for BasicAuth {
    fn from(config: &BasicAuthConfig) -> Self {
        Self::new(config.username.as_str(), config.password.as_str())
    }
}

pub async fn require_basic_auth(
    State(auth): State<BasicAuth>,
    request: Request,
    next: Next,
) -> Response {
    if auth.authorize(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(uri = %request.uri(), "Rejected operator request without valid credentials");
    let mut response = AppError::unauthorized("basic authentication required").into_response();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize() {
        let auth = BasicAuth::new("ops", "pa:ss");
        let good = format!("Basic {}", STANDARD.encode("ops:pa:ss"));
        assert!(auth.authorize(&headers_with(&good)));

        let wrong = format!("Basic {}", STANDARD.encode("ops:nope"));
        assert!(!auth.authorize(&headers_with(&wrong)));
        assert!(!auth.authorize(&headers_with("Bearer abc")));
        assert!(!auth.authorize(&headers_with("Basic %%%")));
        assert!(!auth.authorize(&HeaderMap::new()));
    }

    #[test]
    fn test_authorize_rejects_near_misses() {
        let auth = BasicAuth::new("ops", "s3cret");
        for attempt in ["ops:s3creT", "ops:s3cre", "ops:s3crets", "opz:s3cret", "ops:", ":s3cret"] {
            let header = format!("Basic {}", STANDARD.encode(attempt));
            assert!(!auth.authorize(&headers_with(&header)), "{attempt} accepted");
        }
    }
}
