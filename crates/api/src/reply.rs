//! Success / fail / error entry points.
//!
//! [`Reply`] is an extractor: any handler can take it as an argument and
//! build envelope responses without touching configuration directly.
//!
//! ```ignore
//! async fn show(reply: Reply, Path(id): Path<u64>) -> AppResult<Response> {
//!     let user = lookup(id).ok_or(...)?;
//!     Ok(reply.success(Resource::new(UserResource(user)), ""))
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use envelope_core::config::ResponseConfig;
use envelope_core::envelope::format;
use envelope_core::normalize;
use envelope_core::status::{
    HTTP_ACCEPTED, HTTP_CREATED, HTTP_FORBIDDEN, HTTP_METHOD_NOT_ALLOWED, HTTP_NOT_FOUND,
    HTTP_NO_CONTENT, HTTP_OK, HTTP_UNAUTHORIZED, HTTP_UNPROCESSABLE_ENTITY,
};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::payload::{OriginalData, Payload};
use crate::request::RequestContext;
use crate::responder::{JsonOptions, Responder};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a fail/error entry point.
///
/// `Escalate` is produced when no error detail was supplied: the response
/// should abort the handler rather than be returned as a normal value.
#[must_use = "an escalated outcome must be returned or propagated"]
#[derive(Debug)]
pub enum Outcome {
    Handled(Response),
    Escalate(Response),
}

impl Outcome {
    pub fn is_escalated(&self) -> bool {
        matches!(self, Outcome::Escalate(_))
    }

    pub fn response(&self) -> &Response {
        match self {
            Outcome::Handled(response) | Outcome::Escalate(response) => response,
        }
    }

    /// `Handled` becomes `Ok`, `Escalate` becomes [`AppError::Escalated`] so
    /// it propagates with `?`.
    pub fn into_result(self) -> AppResult<Response> {
        match self {
            Outcome::Handled(response) => Ok(response),
            Outcome::Escalate(response) => Err(AppError::Escalated(Box::new(response))),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Handled(response) | Outcome::Escalate(response) => response,
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Envelope response builder bound to one request.
#[derive(Debug, Clone)]
pub struct Reply {
    responder: Responder,
    request: RequestContext,
}

impl Reply {
    pub fn new(responder: Responder, request: RequestContext) -> Self {
        Self { responder, request }
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn config(&self) -> &ResponseConfig {
        self.responder.config()
    }

    /// 200 success with default headers and encoding.
    pub fn success(&self, payload: impl Into<Payload>, message: &str) -> Response {
        self.success_with(payload, message, HTTP_OK, HeaderMap::new(), JsonOptions::default())
    }

    /// Success with every knob exposed. The payload is normalized according
    /// to its shape before formatting.
    pub fn success_with(
        &self,
        payload: impl Into<Payload>,
        message: &str,
        status: u16,
        headers: HeaderMap,
        options: JsonOptions,
    ) -> Response {
        let format_config = &self.config().format;

        match payload.into() {
            Payload::Collection(collection) => {
                let data = normalize::collection(
                    collection.resolve_items(&self.request),
                    collection.with_map(),
                    collection.additional_map(),
                    collection.pagination(),
                    format_config,
                );
                let mut response =
                    self.envelope(Value::Object(data), message, status, None, headers, options);
                response
                    .extensions_mut()
                    .insert(OriginalData(collection.originals()));
                collection.with_response(&self.request, &mut response);
                response
            }
            Payload::Paginated(descriptor) => {
                let data = normalize::paginated(descriptor, format_config);
                self.envelope(Value::Object(data), message, status, None, headers, options)
            }
            Payload::Resource(resource) => {
                let [resolved, with, additional] = resource.resolve_parts(&self.request);
                let data = normalize::resource(resolved, with, additional);
                let mut response =
                    self.envelope(Value::Object(data), message, status, None, headers, options);
                response
                    .extensions_mut()
                    .insert(OriginalData(resource.original()));
                resource.with_response(&self.request, &mut response);
                response
            }
            Payload::Serializable(value) | Payload::Raw(value) => {
                self.envelope(normalize::wrap(value), message, status, None, headers, options)
            }
            Payload::Empty => {
                self.envelope(normalize::wrap(Value::Null), message, status, None, headers, options)
            }
        }
    }

    /// Error envelope with empty data.
    ///
    /// Without `errors` (or with JSON `null`) the outcome escalates.
    pub fn error(&self, message: &str, status: u16, errors: Option<Value>) -> Outcome {
        self.error_with(message, status, errors, HeaderMap::new(), JsonOptions::default())
    }

    pub fn error_with(
        &self,
        message: &str,
        status: u16,
        errors: Option<Value>,
        headers: HeaderMap,
        options: JsonOptions,
    ) -> Outcome {
        let errors = errors.filter(|errors| !errors.is_null());
        let escalate = errors.is_none();
        let response = self.envelope(Value::Null, message, status, errors, headers, options);

        if escalate {
            tracing::debug!(status, path = %self.request.path(), "Escalating error response");
            Outcome::Escalate(response)
        } else {
            Outcome::Handled(response)
        }
    }

    /// Same as [`error`](Self::error); callers pass a 4xx status.
    pub fn fail(&self, message: &str, status: u16, errors: Option<Value>) -> Outcome {
        self.error(message, status, errors)
    }

    pub fn fail_with(
        &self,
        message: &str,
        status: u16,
        errors: Option<Value>,
        headers: HeaderMap,
        options: JsonOptions,
    ) -> Outcome {
        self.error_with(message, status, errors, headers, options)
    }

    /// 201 with an optional `Location` header.
    pub fn created(&self, payload: impl Into<Payload>, message: &str, location: Option<&str>) -> Response {
        let response = self.success_with(payload, message, HTTP_CREATED, HeaderMap::new(), JsonOptions::default());
        with_location(response, location)
    }

    /// 202 with an optional `Location` header.
    pub fn accepted(&self, payload: impl Into<Payload>, message: &str, location: Option<&str>) -> Response {
        let response = self.success_with(payload, message, HTTP_ACCEPTED, HeaderMap::new(), JsonOptions::default());
        with_location(response, location)
    }

    pub fn no_content(&self, message: &str) -> Response {
        self.success_with(Payload::Empty, message, HTTP_NO_CONTENT, HeaderMap::new(), JsonOptions::default())
    }

    pub fn error_unauthorized(&self, message: &str) -> Outcome {
        self.error(message, HTTP_UNAUTHORIZED, None)
    }

    pub fn error_forbidden(&self, message: &str) -> Outcome {
        self.error(message, HTTP_FORBIDDEN, None)
    }

    pub fn error_not_found(&self, message: &str) -> Outcome {
        self.error(message, HTTP_NOT_FOUND, None)
    }

    pub fn error_method_not_allowed(&self, message: &str) -> Outcome {
        self.fail(message, HTTP_METHOD_NOT_ALLOWED, None)
    }

    pub fn error_unprocessable_entity(&self, message: &str) -> Outcome {
        self.fail(message, HTTP_UNPROCESSABLE_ENTITY, None)
    }

    fn envelope(
        &self,
        data: Value,
        message: &str,
        status: u16,
        errors: Option<Value>,
        headers: HeaderMap,
        options: JsonOptions,
    ) -> Response {
        let envelope = format(data, message, status, errors, self.config());
        self.responder.respond(&envelope, status, headers, options)
    }
}

fn with_location(mut response: Response, location: Option<&str>) -> Response {
    let Some(location) = location.filter(|l| !l.is_empty()) else {
        return response;
    };
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
        }
        Err(err) => {
            tracing::warn!(error = %err, location, "Skipping invalid Location header");
        }
    }
    response
}

impl<S> FromRequestParts<S> for Reply
where
    S: Send + Sync,
    Arc<ResponseConfig>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<ResponseConfig>::from_ref(state);
        Ok(Self::new(Responder::new(config), RequestContext::from_parts(parts)))
    }
}
