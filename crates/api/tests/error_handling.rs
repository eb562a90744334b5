//! Tests for failure translation.
//!
//! `AppError` values become placeholder responses carrying a `Failure`; the
//! translation middleware renders them as envelopes using the request's
//! context. These tests mount small routers with the same middleware pair
//! the application uses (panic catcher inside the translator).

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::header::{LOCATION, RETRY_AFTER};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use common::{body_json, body_text, get as get_json, get_with_headers};
use envelope_api::error::{AppError, AppResult, ValidationFailure};
use envelope_api::exception::{
    panic_failure, timeout_failure, translate_failures, ExceptionTranslator, Failure,
};
use envelope_core::config::ResponseConfig;
use envelope_core::error::CoreError;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

async fn missing_user() -> AppResult<()> {
    Err(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: "9".into(),
    }))
}

async fn internal() -> AppResult<()> {
    Err(anyhow::anyhow!("connection refused")
        .context("loading users")
        .into())
}

async fn invalid() -> AppResult<()> {
    let mut fields = BTreeMap::new();
    fields.insert("email".to_string(), vec!["The email must be a valid email address.".to_string()]);
    Err(AppError::Validation(ValidationFailure::new(fields)))
}

async fn unauthenticated() -> AppResult<()> {
    Err(AppError::unauthenticated("Missing Authorization header"))
}

async fn throttled() -> AppResult<()> {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
    Err(AppError::Http {
        status: StatusCode::TOO_MANY_REQUESTS,
        message: "Too Many Attempts.".into(),
        headers,
    })
}

async fn escalated() -> AppResult<()> {
    let response = (StatusCode::IM_A_TEAPOT, "already rendered").into_response();
    Err(AppError::Escalated(Box::new(response)))
}

async fn panics() -> &'static str {
    panic!("handler exploded")
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

fn failing_app(config: ResponseConfig) -> Router {
    let translator = Arc::new(ExceptionTranslator::new(Arc::new(config), "/login"));
    Router::new()
        .route("/missing-user", get(missing_user))
        .route("/internal", get(internal))
        .route("/invalid", get(invalid))
        .route("/unauthenticated", get(unauthenticated))
        .route("/throttled", get(throttled))
        .route("/escalated", get(escalated))
        .route("/panic", get(panics))
        .route("/slow", get(slow))
        .layer(CatchPanicLayer::custom(panic_failure))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(timeout_failure))
                .timeout(Duration::from_millis(50)),
        )
        .layer(from_fn_with_state(translator, translate_failures))
}

fn restful() -> ResponseConfig {
    ResponseConfig {
        is_restful: true,
        ..ResponseConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Test: AppError::into_response produces a placeholder carrying a Failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn app_error_into_response_is_a_placeholder() {
    let response = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: "42".into(),
    })
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    match response.extensions().get::<Failure>() {
        Some(Failure::Throwable(report)) => {
            assert_eq!(report.status, Some(404));
            assert_eq!(report.message, "Project with id 42 not found");
        }
        other => panic!("expected a throwable failure, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound renders a fail envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_renders_fail_envelope() {
    let response = get_json(failing_app(ResponseConfig::default()), "/missing-user").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "fail");
    assert_eq!(json["code"], "20000");
    assert_eq!(json["message"], "Fail");
    assert_eq!(json["data"], json!({}));
    assert_eq!(json["errors"], json!({"message": "User with id 9 not found"}));
}

#[tokio::test]
async fn not_found_error_keeps_transport_status_when_restful() {
    let response = get_json(failing_app(restful()), "/missing-user").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Internal errors hide details unless debug is on
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_is_sanitized() {
    let response = get_json(failing_app(restful()), "/internal").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "30000");
    assert_eq!(json["message"], "Error");
    assert_eq!(json["errors"], json!({"message": "Server Error"}));
}

#[tokio::test]
async fn internal_error_is_described_in_debug() {
    let config = ResponseConfig {
        debug: true,
        ..ResponseConfig::default()
    };
    let json = body_json(get_json(failing_app(config), "/internal").await).await;

    assert_eq!(json["errors"]["message"], "loading users");
    assert_eq!(json["errors"]["exception"], "Internal");
    assert_eq!(json["errors"]["chain"], json!(["connection refused"]));
}

// ---------------------------------------------------------------------------
// Test: Validation failures use the configured message and field errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_failure_renders_field_errors() {
    let response = get_json(failing_app(restful()), "/invalid").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["status"], "fail");
    assert_eq!(json["code"], "20002");
    assert_eq!(json["message"], "Unprocessable Entity");
    assert_eq!(
        json["errors"],
        json!({"email": ["The email must be a valid email address."]})
    );
}

#[tokio::test]
async fn validation_failure_falls_back_to_its_own_message() {
    let mut config = ResponseConfig::default();
    config.code.validation = String::new();

    let json = body_json(get_json(failing_app(config), "/invalid").await).await;
    assert_eq!(json["message"], "The email must be a valid email address.");
    assert_eq!(json["code"], "422");
}

// ---------------------------------------------------------------------------
// Test: Authentication failures depend on what the client expects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthenticated_json_client_gets_unauthorized_envelope() {
    let json = body_json(get_json(failing_app(ResponseConfig::default()), "/unauthenticated").await).await;

    assert_eq!(json["status"], "fail");
    assert_eq!(json["code"], "20001");
    assert_eq!(json["message"], "Unauthenticated");
    assert_eq!(json["errors"], json!({}));
}

#[tokio::test]
async fn unauthenticated_browser_is_redirected_to_login() {
    let response = get_with_headers(
        failing_app(ResponseConfig::default()),
        "/unauthenticated",
        &[("accept", "text/html")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/login");
}

// ---------------------------------------------------------------------------
// Test: HTTP errors keep their status and headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_error_keeps_headers() {
    let response = get_json(failing_app(restful()), "/throttled").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RETRY_AFTER], "30");

    let json = body_json(response).await;
    assert_eq!(json["status"], "fail");
    assert_eq!(json["errors"]["message"], "Too Many Attempts.");
}

// ---------------------------------------------------------------------------
// Test: Escalated responses pass through untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn escalated_response_is_not_rewritten() {
    let response = get_json(failing_app(ResponseConfig::default()), "/escalated").await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_text(response).await, "already rendered");
}

// ---------------------------------------------------------------------------
// Test: Panics are rendered as error envelopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn panic_renders_error_envelope() {
    let response = get_json(failing_app(restful()), "/panic").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["errors"], json!({"message": "Server Error"}));
}

// ---------------------------------------------------------------------------
// Test: Timeouts are rendered as fail envelopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timeout_renders_fail_envelope() {
    let response = get_json(failing_app(ResponseConfig::default()), "/slow").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "fail");
    assert_eq!(json["code"], "20000");
    assert_eq!(json["errors"], json!({"message": "Request Timeout"}));
}

#[tokio::test]
async fn timeout_keeps_408_when_restful() {
    let response = get_json(failing_app(restful()), "/slow").await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

// ---------------------------------------------------------------------------
// Test: Host default rendering when unified JSON is off
// ---------------------------------------------------------------------------

#[tokio::test]
async fn host_default_json_without_envelope() {
    let config = ResponseConfig {
        is_unified_return_json: false,
        ..ResponseConfig::default()
    };
    let response = get_json(failing_app(config), "/internal").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json, json!({"message": "Server Error"}));
}

#[tokio::test]
async fn host_default_plain_text_for_browsers() {
    let config = ResponseConfig {
        is_unified_return_json: false,
        ..ResponseConfig::default()
    };
    let response = get_with_headers(failing_app(config), "/missing-user", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "User with id 9 not found");
}
