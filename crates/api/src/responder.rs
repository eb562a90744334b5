//! Envelope to transport response.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use envelope_core::config::ResponseConfig;
use envelope_core::envelope::Envelope;

/// JSON encoding options for the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl JsonOptions {
    pub const COMPACT: Self = Self { pretty: false };
    pub const PRETTY: Self = Self { pretty: true };
}

/// Serializes envelopes and applies the transport status policy.
#[derive(Debug, Clone)]
pub struct Responder {
    config: Arc<ResponseConfig>,
}

impl Responder {
    pub fn new(config: Arc<ResponseConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// The transport status for a logical status.
    ///
    /// Non-RESTful mode pins every response to 200; the logical status
    /// still travels in the envelope.
    pub fn transport_status(&self, status: u16) -> StatusCode {
        if !self.config.is_restful {
            return StatusCode::OK;
        }
        StatusCode::from_u16(status).unwrap_or_else(|_| {
            tracing::warn!(status, "Status is not a valid HTTP status, responding with 500");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    /// Build the transport response for an envelope.
    ///
    /// `content-type: application/json` is set first, so caller headers may
    /// override it.
    pub fn respond(
        &self,
        envelope: &Envelope,
        status: u16,
        headers: HeaderMap,
        options: JsonOptions,
    ) -> Response {
        let body = if options.pretty {
            serde_json::to_vec_pretty(envelope)
        } else {
            serde_json::to_vec(envelope)
        };

        let body = match body {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response envelope");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };

        let transport = self.transport_status(status);
        tracing::debug!(
            status,
            transport = transport.as_u16(),
            category = %envelope.status,
            code = %envelope.code,
            "Responding with envelope",
        );

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = transport;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // Replaces same-named headers, keeps multi-valued ones intact.
        response.headers_mut().extend(headers);
        response
    }
}
