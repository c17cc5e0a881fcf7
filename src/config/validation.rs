//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, addresses parse)
//! - Check operator routes are reachable and protected when enabled
//! - Keep operator routes off the built-in liveness path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, OperatorRouteConfig};

/// Paths served by the gateway itself.
pub const RESERVED_PATHS: &[&str] = &["/ping"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server.request_timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("{field}: path must be a literal starting with '/' and not ending with '/', got {value:?}")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field}: {value:?} is reserved by the gateway")]
    ReservedPath { field: &'static str, value: String },

    #[error("{field}: basic auth username and password are required when enabled")]
    MissingCredentials { field: &'static str },

    #[error("{field}: paths of operator routes must differ")]
    PathConflict { field: &'static str },

    #[error("server.cors.allowed_origins: {0:?} is not a valid origin")]
    InvalidOrigin(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &config.server;

    if server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: server.bind_address.clone(),
        });
    }

    if server.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    validate_operator_route("server.swagger", &server.swagger, &mut errors);
    validate_operator_route("server.platform", &server.platform, &mut errors);

    if server.swagger.enabled
        && server.platform.enabled
        && (server.platform.path == server.swagger.path
            || server.platform.path.starts_with(&format!("{}/", server.swagger.path)))
    {
        errors.push(ValidationError::PathConflict {
            field: "server.platform.path",
        });
    }

    for origin in &server.cors.allowed_origins {
        if origin == "*" || axum::http::HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn validate_operator_route(
    field: &'static str,
    route: &OperatorRouteConfig,
    errors: &mut Vec<ValidationError>,
) {
    if !route.enabled {
        return;
    }

    let path = route.path.as_str();
    if !path.starts_with('/')
        || path.len() < 2
        || path.ends_with('/')
        || path.contains(['{', '}', '*'])
    {
        errors.push(ValidationError::InvalidPath {
            field,
            value: route.path.clone(),
        });
    } else if RESERVED_PATHS.contains(&path) {
        errors.push(ValidationError::ReservedPath {
            field,
            value: route.path.clone(),
        });
    }

    if route.basic_auth.username.is_empty() || route.basic_auth.password.is_empty() {
        errors.push(ValidationError::MissingCredentials { field });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".into();
        config.server.request_timeout_ms = 0;
        config.server.platform.enabled = true;
        config.server.platform.path = "platform".into();
        config.server.cors.allowed_origins = vec!["*".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::MissingCredentials {
            field: "server.platform"
        }));
        assert!(errors.contains(&ValidationError::InvalidOrigin("*".into())));
    }

    #[test]
    fn test_operator_paths_must_differ() {
        let mut config = AppConfig::default();
        for route in [&mut config.server.swagger, &mut config.server.platform] {
            route.enabled = true;
            route.path = "/ops".into();
            route.basic_auth.username = "u".into();
            route.basic_auth.password = "p".into();
        }

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PathConflict {
                field: "server.platform.path"
            }]
        );
    }

    fn enabled(path: &str) -> OperatorRouteConfig {
        let mut route = OperatorRouteConfig::default();
        route.enabled = true;
        route.path = path.into();
        route.basic_auth.username = "u".into();
        route.basic_auth.password = "p".into();
        route
    }

    #[test]
    fn test_operator_path_cannot_take_ping() {
        let mut config = AppConfig::default();
        config.server.platform = enabled("/ping");

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ReservedPath {
                field: "server.platform",
                value: "/ping".into()
            }]
        );
    }

    #[test]
    fn test_operator_path_must_be_literal() {
        for path in ["/{id}", "/ops/{*rest}", "/ops}"] {
            let mut config = AppConfig::default();
            config.server.swagger = enabled(path);

            let errors = validate_config(&config).unwrap_err();
            assert!(
                matches!(errors.as_slice(), [ValidationError::InvalidPath { field: "server.swagger", .. }]),
                "{path} accepted: {errors:?}"
            );
        }
    }

    #[test]
    fn test_platform_cannot_sit_under_docs() {
        let mut config = AppConfig::default();
        config.server.swagger = enabled("/docs");
        config.server.platform = enabled("/docs/platform");

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PathConflict {
                field: "server.platform.path"
            }]
        );
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: "x".into(),
        };
        assert_eq!(err.to_string(), "server.bind_address: invalid socket address \"x\"");
    }
}
