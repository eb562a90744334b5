use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use envelope_core::error::CoreError;
use envelope_core::status::HTTP_UNPROCESSABLE_ENTITY;
use serde_json::{Map, Value};

use crate::exception::{Failure, ThrowableReport};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// [`IntoResponse`] turns every variant except [`AppError::Escalated`] into a
/// placeholder carrying a [`Failure`]; the
/// [`translate_failures`](crate::exception::translate_failures) middleware
/// renders it with the request's context.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `envelope_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request carries no valid credentials.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        message: String,
        /// Where browsers are sent to log in; the configured login path
        /// when `None`.
        redirect_to: Option<String>,
    },

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    /// An error that carries its own HTTP status and headers.
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        headers: HeaderMap,
    },

    /// A finished envelope response promoted to an error so it short-circuits
    /// the handler. Rendered unchanged.
    #[error("Escalated response with status {}", .0.status())]
    Escalated(Box<Response>),

    /// Any other failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
            redirect_to: None,
        }
    }

    /// Convert into the failure description the translator renders.
    ///
    /// Returns the response itself for [`AppError::Escalated`].
    pub fn into_failure(self) -> Result<Failure, Response> {
        let failure = match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                Failure::Throwable(ThrowableReport::http(
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                    HeaderMap::new(),
                ))
            }
            AppError::Core(core) => {
                tracing::error!(error = %core, "Core error");
                Failure::Throwable(ThrowableReport::from_error("CoreError", &core))
            }
            AppError::Unauthenticated {
                message,
                redirect_to,
            } => Failure::Unauthenticated {
                message,
                redirect_to,
            },
            AppError::Validation(validation) => Failure::Validation {
                message: validation.message,
                status: validation.status,
                errors: validation.errors,
            },
            AppError::Http {
                status,
                message,
                headers,
            } => Failure::Throwable(ThrowableReport::http(status, message, headers)),
            AppError::Escalated(response) => return Err(*response),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                Failure::Throwable(ThrowableReport {
                    status: None,
                    headers: HeaderMap::new(),
                    message: err.to_string(),
                    kind: "Internal".into(),
                    chain: err.chain().skip(1).map(|e| e.to_string()).collect(),
                })
            }
        };
        Ok(failure)
    }
}

// Extractor rejections keep axum's status and message but render through
// the translator like any other HTTP failure.
macro_rules! rejection_into_http {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    AppError::http(rejection.status(), rejection.body_text())
                }
            }
        )+
    };
}

rejection_into_http!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.into_failure() {
            Ok(failure) => failure.into_placeholder(),
            Err(escalated) => escalated,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Field-level validation errors, `{field: [messages]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub message: String,
    pub status: u16,
    pub errors: Map<String, Value>,
}

impl ValidationFailure {
    /// Build from a field map; the message summarises the first error.
    pub fn new(errors: BTreeMap<String, Vec<String>>) -> Self {
        let mut all = errors.values().flatten();
        let message = match all.next() {
            None => "The given data was invalid.".to_string(),
            Some(first) => {
                let remaining = all.count();
                match remaining {
                    0 => first.clone(),
                    1 => format!("{first} (and 1 more error)"),
                    n => format!("{first} (and {n} more errors)"),
                }
            }
        };

        Self {
            message,
            status: HTTP_UNPROCESSABLE_ENTITY,
            errors: errors
                .into_iter()
                .map(|(field, messages)| (field, Value::from(messages)))
                .collect(),
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<validator::ValidationErrors> for ValidationFailure {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let field = field.to_string();
                let messages = errors
                    .iter()
                    .map(|error| match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("The {field} field is invalid ({}).", error.code),
                    })
                    .collect();
                (field, messages)
            })
            .collect();
        Self::new(fields)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}
