//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with built-in and business routes
//! - Wire up the request pipeline in its fixed order
//! - Gate operator routes behind basic authentication
//! - Bind to a listener and serve until shutdown
//!
//! # Design Decisions
//! - Constructed exactly once by startup code; no lazy global
//! - The router is frozen by [`HttpServerBuilder::build`]
//! - Operator routes are absent unless enabled in configuration
//! - Route clashes are reported as [`RouteError`] at registration; an
//!   operator route that would clash is skipped with an error log

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, on, MethodFilter};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

use crate::codes::MessageCatalog;
use crate::config::validation::{validate_operator_route, RESERVED_PATHS};
use crate::config::{AppConfig, OperatorRouteConfig, SettingsReader};
use crate::http::handlers::{self, AppState, RouteDoc};
use crate::http::middleware::{
    cors_layer, deadline_guard, enrich_context, envelope_stage, log_exchange, normalize_request_id,
    recover_panics, require_basic_auth, BasicAuth, DeadlineGuard, Enricher, LogSettings,
    PanicRecovery,
};
use crate::http::response::EnvelopeBuilder;

/// Route registration failure.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("method {method} on {path} cannot be routed")]
    UnsupportedMethod { method: Method, path: String },

    #[error("{path:?} is not a valid route path")]
    InvalidPath { path: String },

    #[error("{method} {path} is already registered")]
    Duplicate { method: Method, path: String },

    #[error("{path} is served by the gateway")]
    Reserved { path: String },

    #[error("{path} overlaps {existing} with different parameter names")]
    Conflict { path: String, existing: String },
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Server with the built-in routes only.
    pub fn new(config: AppConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: AppConfig) -> HttpServerBuilder {
        HttpServerBuilder::new(config)
    }

    /// Router with the full pipeline applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` resolves, then drain
    /// in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_ms = self.config.server.request_timeout_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Collects routes and collaborators before the router is frozen.
pub struct HttpServerBuilder {
    config: AppConfig,
    catalog: MessageCatalog,
    settings: Option<Arc<dyn SettingsReader>>,
    routes: Router,
    docs: Vec<RouteDoc>,
    claimed: HashSet<(Method, String)>,
}

impl HttpServerBuilder {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: MessageCatalog::builtin(),
            settings: None,
            routes: Router::new(),
            claimed: HashSet::new(),
            docs: vec![RouteDoc {
                method: Method::GET,
                path: "/ping".to_string(),
            }],
        }
    }

    /// Message catalog used to compile codes into envelopes.
    pub fn catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Source of the diagnostics dump. Defaults to the server configuration.
    pub fn settings(mut self, settings: Arc<dyn SettingsReader>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Register a business route.
    pub fn route<H, T>(mut self, method: Method, path: &str, handler: H) -> Result<Self, RouteError>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let filter = MethodFilter::try_from(method.clone()).map_err(|_| RouteError::UnsupportedMethod {
            method: method.clone(),
            path: path.to_string(),
        })?;
        if !is_route_path(path) {
            return Err(RouteError::InvalidPath {
                path: path.to_string(),
            });
        }
        if self.is_reserved(path) {
            return Err(RouteError::Reserved {
                path: path.to_string(),
            });
        }
        if let Some((_, existing)) = self
            .claimed
            .iter()
            .find(|(_, existing)| existing != path && route_shape(existing) == route_shape(path))
        {
            return Err(RouteError::Conflict {
                path: path.to_string(),
                existing: existing.clone(),
            });
        }
        if !self.claimed.insert((method.clone(), path.to_string())) {
            return Err(RouteError::Duplicate {
                method,
                path: path.to_string(),
            });
        }

        self.routes = self.routes.route(path, on(filter, handler));
        self.docs.push(RouteDoc {
            method,
            path: path.to_string(),
        });
        Ok(self)
    }

    /// Paths owned by the built-in and enabled operator routes.
    fn is_reserved(&self, path: &str) -> bool {
        let server = &self.config.server;
        if RESERVED_PATHS.contains(&path) {
            return true;
        }
        if server.platform.enabled && server.platform.path == path {
            return true;
        }
        server.swagger.enabled
            && (server.swagger.path == path || path.starts_with(&format!("{}/", server.swagger.path)))
    }

    /// Freeze the router and apply the pipeline.
    pub fn build(self) -> HttpServer {
        let Self {
            config,
            catalog,
            settings,
            routes,
            mut docs,
            ..
        } = self;

        let server = &config.server;
        let meta = &config.meta;

        let envelopes = EnvelopeBuilder::new(meta.host.as_str(), meta.version.as_str(), Arc::new(catalog));
        let settings = settings.unwrap_or_else(|| Arc::new(config.clone()) as Arc<dyn SettingsReader>);

        let platform_enabled = usable_operator_route("server.platform", &server.platform);
        let mut swagger_enabled = usable_operator_route("server.swagger", &server.swagger);
        if swagger_enabled
            && platform_enabled
            && (server.platform.path == server.swagger.path
                || server.platform.path.starts_with(&format!("{}/", server.swagger.path)))
        {
            tracing::error!(
                platform = %server.platform.path,
                swagger = %server.swagger.path,
                "Operator route not mounted: documentation path overlaps diagnostics"
            );
            swagger_enabled = false;
        }

        if platform_enabled {
            docs.push(RouteDoc {
                method: Method::GET,
                path: server.platform.path.clone(),
            });
        }

        let state = AppState {
            meta: Arc::new(meta.clone()),
            settings,
            routes: docs.into(),
            docs_path: server.swagger.path.as_str().into(),
        };

        let mut operator = Router::<AppState>::new();
        if platform_enabled {
            operator = operator.merge(gated(
                &server.platform,
                Router::new().route(&server.platform.path, get(handlers::platform_config)),
            ));
            tracing::info!(path = %server.platform.path, "Diagnostics route enabled");
        }
        if swagger_enabled {
            let assets = format!("{}/{{*asset}}", server.swagger.path.trim_end_matches('/'));
            operator = operator.merge(gated(
                &server.swagger,
                Router::new().route(&assets, get(handlers::docs_asset)),
            ));
            tracing::info!(path = %server.swagger.path, "Documentation route enabled");
        }

        let log_settings = LogSettings {
            log_request: server.log_request,
            log_response: server.log_response,
        };

        // Last layer added runs first.
        let router = Router::new()
            .route("/ping", get(handlers::ping))
            .merge(operator.with_state(state))
            .merge(routes)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .fallback(handlers::not_found)
            .layer(from_fn_with_state(envelopes.clone(), envelope_stage))
            .layer(from_fn_with_state(log_settings, log_exchange))
            .layer(from_fn_with_state(Enricher::new(meta.version.as_str()), enrich_context))
            .layer(from_fn_with_state(
                DeadlineGuard::new(server.request_timeout(), envelopes.clone(), log_settings),
                deadline_guard,
            ))
            .layer(from_fn_with_state(
                PanicRecovery::new(envelopes, log_settings),
                recover_panics,
            ))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(from_fn(normalize_request_id))
            .layer(cors_layer(&server.cors));

        HttpServer { router, config }
    }
}

/// Enabled and mountable. Problems are logged, not raised, so a config that
/// skipped validation cannot bring the router down.
fn usable_operator_route(field: &'static str, route: &OperatorRouteConfig) -> bool {
    if !route.enabled {
        return false;
    }
    let mut problems = Vec::new();
    validate_operator_route(field, route, &mut problems);
    for problem in &problems {
        tracing::error!(field, error = %problem, "Operator route not mounted");
    }
    problems.is_empty()
}

/// Literal segments, `{name}` captures, and a trailing `{*name}` wildcard.
fn is_route_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let segments: Vec<&str> = rest.split('/').collect();
    segments.iter().enumerate().all(|(i, segment)| {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                let name = name.strip_prefix('*').filter(|_| i + 1 == segments.len()).unwrap_or(name);
                !name.is_empty() && !name.contains(['{', '}', '*', '/'])
            }
            None => !segment.contains(['{', '}']),
        }
    })
}

/// Path with capture names erased; two paths with one shape must be equal.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| if segment.starts_with('{') { "{}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn gated(route: &OperatorRouteConfig, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(
        BasicAuth::from(&route.basic_auth),
        require_basic_auth,
    ))
}
