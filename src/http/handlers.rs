//! Built-in route handlers.
//!
//! # Responsibilities
//! - Liveness check (`/ping`)
//! - Effective-configuration dump for operators
//! - API documentation page and OpenAPI document
//! - Envelope for unmatched routes

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::codes::Code;
use crate::config::{MetaConfig, SettingsReader};
use crate::error::AppError;
use crate::http::response::Reply;

/// A documented route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDoc {
    pub method: Method,
    pub path: String,
}

/// State shared by the operator routes.
#[derive(Clone)]
pub struct AppState {
    pub meta: Arc<MetaConfig>,
    pub settings: Arc<dyn SettingsReader>,
    pub routes: Arc<[RouteDoc]>,
    pub docs_path: Arc<str>,
}

pub async fn ping() -> Reply {
    Reply::ok("PONG!")
}

#[derive(Debug, Deserialize)]
pub struct PlatformQuery {
    output: Option<String>,
}

/// Dump every effective setting, pretty JSON or YAML.
pub async fn platform_config(
    State(state): State<AppState>,
    query: Result<Query<PlatformQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let settings = state.settings.all_settings();

    if query.output.as_deref() == Some("json") {
        let body = serde_json::to_string_pretty(&settings)
            .map_err(|e| AppError::internal(format!("encode settings: {e}")))?;
        return Ok(([(CONTENT_TYPE, "application/json")], body).into_response());
    }

    let body = serde_yaml::to_string(&settings)
        .map_err(|e| AppError::internal(format!("encode settings: {e}")))?;
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

/// Serve the documentation UI and its OpenAPI document.
pub async fn docs_asset(
    State(state): State<AppState>,
    asset: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(asset) = asset?;
    match asset.as_str() {
        "index.html" => Ok(Html(docs_page(&state)).into_response()),
        "doc.json" => Ok(axum::Json(openapi_document(&state.meta, &state.routes)).into_response()),
        other => Err(AppError::not_found(format!("documentation asset {other:?} not found"))),
    }
}

pub async fn not_found() -> AppError {
    AppError::not_found("route not found")
}

pub async fn method_not_allowed() -> AppError {
    AppError::with_code(Code::METHOD_NOT_ALLOWED, "method not allowed")
}

fn docs_page(state: &AppState) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{path}/doc.json", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##,
        title = state.meta.title,
        path = state.docs_path,
    )
}

/// OpenAPI 3 document for the registered routes.
pub fn openapi_document(meta: &MetaConfig, routes: &[RouteDoc]) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let entry = paths
            .entry(route.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(operations) = entry {
            operations.insert(
                route.method.as_str().to_ascii_lowercase(),
                json!({
                    "responses": {
                        "default": {
                            "description": "Response envelope",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ResponseEnvelope" }
                                }
                            }
                        }
                    }
                }),
            );
        }
    }

    let mut server_url = format!("{}{}", meta.host, meta.base_path.trim_end_matches('/'));
    if server_url.is_empty() {
        server_url.push('/');
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": meta.title,
            "description": meta.description,
            "version": meta.version,
        },
        "servers": [{ "url": server_url }],
        "paths": paths,
        "components": {
            "schemas": {
                "ResponseEnvelope": {
                    "type": "object",
                    "required": ["message", "metadata"],
                    "properties": {
                        "message": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "body": { "type": "string" }
                            }
                        },
                        "metadata": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "statusCode": { "type": "integer" },
                                "status": { "type": "string" },
                                "message": { "type": "string" },
                                "error": {
                                    "type": "object",
                                    "properties": {
                                        "code": { "type": "integer" },
                                        "message": { "type": "string" }
                                    }
                                }
                            }
                        },
                        "data": {},
                        "pagination": {
                            "type": "object",
                            "properties": {
                                "currentPage": { "type": "integer" },
                                "currentElements": { "type": "integer" },
                                "totalPages": { "type": "integer" },
                                "totalElements": { "type": "integer" },
                                "sortBy": { "type": "array", "items": { "type": "string" } },
                                "cursorStart": { "type": "string" },
                                "cursorEnd": { "type": "string" }
                            }
                        }
                    }
                }
            }
        }
    })
}
