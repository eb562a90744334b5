//! Liveness endpoint.

use axum::response::Response;
use serde::Serialize;

use crate::error::AppResult;
use crate::payload::Payload;
use crate::reply::Reply;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

/// GET /health
///
/// Service status and version inside a success envelope.
pub async fn health_check(reply: Reply) -> AppResult<Response> {
    let payload = Payload::serialize(&HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })?;
    Ok(reply.success(payload, ""))
}
