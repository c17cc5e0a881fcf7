//! Response shaping.
//!
//! # Responsibilities
//! - Turn a handler outcome (success payload or [`AppError`]) into the
//!   canonical [`ResponseEnvelope`]
//! - Stamp path, status and summary metadata from the request frame
//! - Echo the request id back in `X-Request-Id`
//!
//! # Design Decisions
//! - Handlers never see the envelope: they return [`Reply`] or [`AppError`],
//!   which park an [`Outcome`] in the response extensions; the envelope stage
//!   finalizes it once the request frame is known
//! - Payloads are encoded when the `Reply` is built, so the core only moves
//!   already-encoded JSON around
//! - Encoding failures on the success path re-enter the error path instead
//!   of escaping the handler boundary

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::codes::{Code, MessageCatalog};
use crate::context::{RequestContext, X_REQUEST_ID};
use crate::error::AppError;
use crate::http::envelope::{Message, Meta, MetaError, Pagination, ResponseEnvelope};

/// What a request looked like, captured before it is handed downstream.
#[derive(Debug, Clone)]
pub struct Frame {
    method: Method,
    uri: String,
    context: RequestContext,
}

impl Frame {
    pub fn new(method: Method, uri: &Uri, context: RequestContext) -> Self {
        let uri = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        Self {
            method,
            uri,
            context,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Request URI as received (path and query).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Successful handler result.
#[derive(Debug, Clone)]
pub struct Reply {
    code: Code,
    payload: Result<Option<Box<RawValue>>, AppError>,
    pagination: Option<Pagination>,
}

impl Reply {
    /// `SUCCESS` reply carrying `data`.
    pub fn ok(data: impl Serialize) -> Self {
        Self::with_code(Code::SUCCESS, data)
    }

    /// Reply with an explicit success code.
    pub fn with_code(code: Code, data: impl Serialize) -> Self {
        let payload = serde_json::value::to_raw_value(&data)
            .map(Some)
            .map_err(|e| AppError::internal(format!("MarshalHTTPResp: {e}")));

        Self {
            code,
            payload,
            pagination: None,
        }
    }

    /// Reply without a `data` field.
    pub fn empty(code: Code) -> Self {
        Self {
            code,
            payload: Ok(None),
            pagination: None,
        }
    }

    pub fn paginated(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Outcome parked in response extensions until the envelope stage runs.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Success {
        code: Code,
        data: Option<Box<RawValue>>,
        pagination: Option<Pagination>,
    },
    Failure(AppError),
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = match self {
            Outcome::Success { .. } => StatusCode::OK,
            Outcome::Failure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.payload {
            Ok(data) => Outcome::Success {
                code: self.code,
                data,
                pagination: self.pagination,
            },
            Err(err) => Outcome::Failure(err),
        }
        .into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Outcome::Failure(self).into_response()
    }
}

/// Largest framework error body kept as a diagnostic message.
const BARE_ERROR_BODY_LIMIT: usize = 16 * 1024;

/// Builds envelopes for a fixed host and catalog.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    host: Arc<str>,
    service_version: Arc<str>,
    catalog: Arc<MessageCatalog>,
}

impl EnvelopeBuilder {
    pub fn new(
        host: impl Into<Arc<str>>,
        service_version: impl Into<Arc<str>>,
        catalog: Arc<MessageCatalog>,
    ) -> Self {
        Self {
            host: host.into(),
            service_version: service_version.into(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    /// Capture the frame of a request.
    ///
    /// Uses the enriched context when present, otherwise derives one from
    /// the headers (stages that run before enrichment).
    pub fn frame(&self, request: &Request) -> Frame {
        let context = request
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext::from_headers(request.headers(), &self.service_version));

        Frame::new(request.method().clone(), request.uri(), context)
    }

    fn meta(&self, frame: &Frame, status: StatusCode, error: Option<MetaError>) -> Meta {
        let status_text = status.canonical_reason().unwrap_or_default();
        Meta {
            path: format!("{}{}", self.host, frame.uri),
            status_code: status.as_u16(),
            status: status_text.to_string(),
            message: format!(
                "{} {} [{}] {}",
                frame.method,
                frame.uri,
                status.as_u16(),
                status_text
            ),
            error,
        }
    }

    /// Build the envelope for a success code.
    pub fn success_envelope(
        &self,
        frame: &Frame,
        code: Code,
        data: Option<Box<RawValue>>,
        pagination: Option<Pagination>,
    ) -> (StatusCode, ResponseEnvelope) {
        let compiled = self.catalog.compile_success(code, frame.context.language());
        let envelope = ResponseEnvelope {
            message: Message {
                title: compiled.title.to_string(),
                body: compiled.body.to_string(),
            },
            meta: self.meta(frame, compiled.http_status, None),
            data,
            pagination,
        };
        (compiled.http_status, envelope)
    }

    /// Build the envelope for an error.
    ///
    /// `metadata.error.message` carries the raw error text; the localized
    /// body is what end users see.
    pub fn error_envelope(&self, frame: &Frame, err: &AppError) -> (StatusCode, ResponseEnvelope) {
        let compiled = self.catalog.compile(err, frame.context.language());
        let meta_error = MetaError {
            code: compiled.code.value(),
            message: err.to_string(),
        };
        let envelope = ResponseEnvelope {
            message: Message {
                title: compiled.title.to_string(),
                body: compiled.body.to_string(),
            },
            meta: self.meta(frame, compiled.http_status, Some(meta_error)),
            data: None,
            pagination: None,
        };
        (compiled.http_status, envelope)
    }

    /// Success response; falls back to the error path if encoding fails.
    pub fn success(
        &self,
        frame: &Frame,
        code: Code,
        data: Option<Box<RawValue>>,
        pagination: Option<Pagination>,
    ) -> Response {
        let (status, envelope) = self.success_envelope(frame, code, data, pagination);
        match self.write(frame, status, &envelope) {
            Ok(response) => response,
            Err(e) => self.error(frame, &AppError::internal(format!("MarshalHTTPResp: {e}"))),
        }
    }

    /// Error response.
    pub fn error(&self, frame: &Frame, err: &AppError) -> Response {
        let (status, envelope) = self.error_envelope(frame, err);

        tracing::error!(
            request_id = %frame.context.request_id(),
            code = envelope.meta.error.as_ref().map(|e| e.code).unwrap_or_default(),
            status = status.as_u16(),
            error = %err,
            "Request failed"
        );

        match self.write(frame, status, &envelope) {
            Ok(response) => response,
            Err(e) => {
                // Envelope with only string and integer fields; not reachable in practice.
                tracing::error!(request_id = %frame.context.request_id(), error = %e, "Failed to encode error envelope");
                let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                self.echo_request_id(frame, response.headers_mut());
                response
            }
        }
    }

    /// Replace a parked [`Outcome`] with its envelope.
    ///
    /// Headers set by the handler survive, except content type and length.
    /// Error responses produced without an outcome (framework rejections,
    /// method mismatches) are compiled by their status, with their body text
    /// as the diagnostic message. Other responses without an outcome pass
    /// through with the request id echoed.
    pub async fn finalize(&self, frame: &Frame, response: Response) -> Response {
        let (mut parts, body) = response.into_parts();

        let outcome = match parts.extensions.remove::<Outcome>() {
            Some(outcome) => outcome,
            None if parts.status.is_client_error() || parts.status.is_server_error() => {
                let text = axum::body::to_bytes(body, BARE_ERROR_BODY_LIMIT)
                    .await
                    .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
                    .unwrap_or_default();
                let message = if text.is_empty() {
                    parts.status.canonical_reason().unwrap_or_default().to_string()
                } else {
                    text
                };
                Outcome::Failure(AppError::from_status(parts.status, message))
            }
            None => {
                let mut response = Response::from_parts(parts, body);
                self.echo_request_id(frame, response.headers_mut());
                return response;
            }
        };

        let mut built = match outcome {
            Outcome::Success {
                code,
                data,
                pagination,
            } => self.success(frame, code, data, pagination),
            Outcome::Failure(err) => self.error(frame, &err),
        };

        let mut headers = parts.headers;
        headers.remove(CONTENT_TYPE);
        headers.remove(CONTENT_LENGTH);
        headers.extend(built.headers_mut().drain());
        *built.headers_mut() = headers;
        built
    }

    fn write(
        &self,
        frame: &Frame,
        status: StatusCode,
        envelope: &ResponseEnvelope,
    ) -> Result<Response, serde_json::Error> {
        let bytes = serde_json::to_vec(envelope)?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.echo_request_id(frame, response.headers_mut());
        Ok(response)
    }

    fn echo_request_id(&self, frame: &Frame, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(frame.context.request_id()) {
            headers.insert(X_REQUEST_ID, value);
        }
    }
}
