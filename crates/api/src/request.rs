//! Request context handed to resources and the exception translator.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};

/// The parts of the inbound request the response pipeline looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Snapshot of the request parts. Inside nested routers the full URI
    /// is taken from [`OriginalUri`], not the prefix-stripped one.
    pub fn from_parts(parts: &Parts) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.clone(), |original| original.0.clone());
        Self::new(parts.method.clone(), uri, parts.headers.clone())
    }

    /// Request path without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Whether the client expects a structured (JSON) reply.
    ///
    /// True for XHR requests that accept any content type, or whenever the
    /// preferred `Accept` type is JSON.
    pub fn expects_json(&self) -> bool {
        (self.is_ajax() && self.accepts_any_content_type()) || self.wants_json()
    }

    /// The first `Accept` media type contains `/json` or `+json`.
    pub fn wants_json(&self) -> bool {
        self.first_accept()
            .is_some_and(|media| media.contains("/json") || media.contains("+json"))
    }

    pub fn is_ajax(&self) -> bool {
        self.headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    }

    /// No `Accept` header, or the first entry is a wildcard.
    pub fn accepts_any_content_type(&self) -> bool {
        match self.first_accept() {
            None => true,
            Some(media) => media == "*/*" || media == "*",
        }
    }

    fn first_accept(&self) -> Option<String> {
        let accept = self.headers.get(ACCEPT)?.to_str().ok()?;
        let first = accept.split(',').next()?;
        let media = first.split(';').next()?.trim().to_ascii_lowercase();
        (!media.is_empty()).then_some(media)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
