//! Exception translation.
//!
//! Handlers and extractors fail with [`AppError`](crate::error::AppError);
//! its `IntoResponse` impl produces a placeholder response carrying a
//! [`Failure`] extension. [`translate_failures`] sits outside the handlers
//! (and outside the panic catcher), pulls the failure back out and renders
//! it through the envelope pipeline with the request's context.

use std::any::Any;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use envelope_core::config::ResponseConfig;
use envelope_core::status::{
    HTTP_INTERNAL_SERVER_ERROR, HTTP_UNAUTHORIZED, HTTP_UNPROCESSABLE_ENTITY,
};
use serde_json::{json, Map, Value};

use crate::reply::Reply;
use crate::request::RequestContext;
use crate::responder::{JsonOptions, Responder};

/// Message rendered for failures without an HTTP status when details are
/// hidden.
pub const GENERIC_SERVER_ERROR: &str = "Server Error";

/// An unhandled failure awaiting translation.
#[derive(Debug, Clone)]
pub enum Failure {
    Unauthenticated {
        message: String,
        redirect_to: Option<String>,
    },
    Validation {
        message: String,
        status: u16,
        errors: Map<String, Value>,
    },
    Throwable(ThrowableReport),
}

impl Failure {
    /// The status used before (or without) translation.
    pub fn status(&self) -> u16 {
        match self {
            Failure::Unauthenticated { .. } => HTTP_UNAUTHORIZED,
            Failure::Validation { status, .. } => *status,
            Failure::Throwable(report) => report.status.unwrap_or(HTTP_INTERNAL_SERVER_ERROR),
        }
    }

    /// A bare response carrying `self` as an extension.
    pub fn into_placeholder(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, status.canonical_reason().unwrap_or("Error")).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// What is known about a generic failure.
#[derive(Debug, Clone, Default)]
pub struct ThrowableReport {
    /// HTTP status declared by the failure, if it carries one.
    pub status: Option<u16>,
    pub headers: HeaderMap,
    pub message: String,
    /// Short name of the failure type.
    pub kind: String,
    /// Messages of the underlying causes, outermost first.
    pub chain: Vec<String>,
}

impl ThrowableReport {
    pub fn http(status: StatusCode, message: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            status: Some(status.as_u16()),
            headers,
            message: message.into(),
            kind: "HttpError".into(),
            chain: Vec::new(),
        }
    }

    pub fn from_error(kind: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        Self {
            status: None,
            headers: HeaderMap::new(),
            message: err.to_string(),
            kind: kind.to_string(),
            chain,
        }
    }

    /// Structured description placed under the envelope's `errors`.
    ///
    /// Without `debug`, failures that do not declare an HTTP status are
    /// reduced to a generic message.
    pub fn describe(&self, debug: bool) -> Value {
        if debug {
            return json!({
                "message": self.message,
                "exception": self.kind,
                "chain": self.chain,
            });
        }

        let message = if self.status.is_some() {
            self.message.as_str()
        } else {
            GENERIC_SERVER_ERROR
        };
        json!({ "message": message })
    }
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Renders [`Failure`]s as envelope responses.
#[derive(Debug, Clone)]
pub struct ExceptionTranslator {
    responder: Responder,
    login_path: String,
}

impl ExceptionTranslator {
    pub fn new(config: Arc<ResponseConfig>, login_path: impl Into<String>) -> Self {
        Self {
            responder: Responder::new(config),
            login_path: login_path.into(),
        }
    }

    pub fn render(&self, failure: Failure, request: RequestContext) -> Response {
        let reply = Reply::new(self.responder.clone(), request);
        match failure {
            Failure::Unauthenticated {
                message,
                redirect_to,
            } => self.unauthenticated(&reply, &message, redirect_to),
            Failure::Validation {
                message,
                status,
                errors,
            } => self.invalid(&reply, &message, status, errors),
            Failure::Throwable(report) => self.throwable(&reply, report),
        }
    }

    /// Structured clients get the `unauthorized` envelope; browsers are
    /// redirected to log in.
    fn unauthenticated(&self, reply: &Reply, message: &str, redirect_to: Option<String>) -> Response {
        if reply.request().expects_json() {
            let configured = &self.responder.config().code.unauthorized;
            let message = if configured.is_empty() { message } else { configured.as_str() };
            return reply.error_unauthorized(message).into_response();
        }

        let target = redirect_to.unwrap_or_else(|| self.login_path.clone());
        match HeaderValue::try_from(target.as_str()) {
            Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
            Err(err) => {
                tracing::warn!(error = %err, target = %target, "Invalid login redirect target");
                (StatusCode::UNAUTHORIZED, message.to_string()).into_response()
            }
        }
    }

    fn invalid(&self, reply: &Reply, message: &str, status: u16, errors: Map<String, Value>) -> Response {
        let configured = &self.responder.config().code.validation;
        let message = if configured.is_empty() { message } else { configured.as_str() };
        let status = if status == 0 { HTTP_UNPROCESSABLE_ENTITY } else { status };

        reply
            .fail_with(
                message,
                status,
                Some(Value::Object(errors)),
                HeaderMap::new(),
                JsonOptions::COMPACT,
            )
            .into_response()
    }

    fn throwable(&self, reply: &Reply, report: ThrowableReport) -> Response {
        let config = self.responder.config();
        let status = report.status.unwrap_or(HTTP_INTERNAL_SERVER_ERROR);
        let description = report.describe(config.debug);

        if config.is_unified_return_json {
            return reply
                .error_with("", status, Some(description), report.headers, JsonOptions::PRETTY)
                .into_response();
        }

        // Host default rendering: faithful status, no envelope.
        let transport = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = if reply.request().expects_json() {
            (transport, Json(description)).into_response()
        } else {
            let text = description["message"].as_str().unwrap_or(GENERIC_SERVER_ERROR).to_string();
            let mut response = (transport, text).into_response();
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
            response
        };
        response.headers_mut().extend(report.headers);
        response
    }
}

/// Middleware replacing failure placeholders with translated responses.
///
/// Install with `axum::middleware::from_fn_with_state(translator, translate_failures)`
/// outside any layer that may produce failures (including the panic catcher).
pub async fn translate_failures(
    State(translator): State<Arc<ExceptionTranslator>>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::new(
        request.method().clone(),
        request.uri().clone(),
        request.headers().clone(),
    );

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<Failure>() {
        Some(failure) => {
            tracing::debug!(status = failure.status(), path = %context.path(), "Translating failure");
            translator.render(failure, context)
        }
        None => response,
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_failure(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "panic with a non-string payload".to_string()
    };
    tracing::error!(panic = %message, "Handler panicked");

    Failure::Throwable(ThrowableReport {
        message,
        kind: "panic".into(),
        ..ThrowableReport::default()
    })
    .into_placeholder()
}

/// Error handler for `tower::timeout`, installed through
/// `axum::error_handling::HandleErrorLayer` inside [`translate_failures`].
pub async fn timeout_failure(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        return Failure::Throwable(ThrowableReport::http(
            StatusCode::REQUEST_TIMEOUT,
            "Request Timeout",
            HeaderMap::new(),
        ))
        .into_placeholder();
    }

    tracing::error!(error = %err, "Middleware failed");
    Failure::Throwable(ThrowableReport {
        message: err.to_string(),
        kind: "middleware".into(),
        ..ThrowableReport::default()
    })
    .into_placeholder()
}
