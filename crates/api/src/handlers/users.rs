//! Handlers for the `/users` and `/me` resources.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Map};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::payload::{Resource, ResourceCollection};
use crate::query::PageParams;
use crate::reply::Reply;
use crate::state::AppState;
use crate::users::{CreateUser, UserResource};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// One page of users as a resource collection with `meta` pagination.
pub async fn list_users(
    reply: Reply,
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = params?;
    let page = state
        .users
        .page(params.page(), params.per_page(), reply.request().path())
        .map(UserResource);

    tracing::debug!(
        page = page.current_page(),
        per_page = page.per_page(),
        total = page.total(),
        "Listing users",
    );

    let collection = ResourceCollection::from_page(page);
    if collection.is_empty() {
        tracing::debug!("Requested page is past the last user");
    }
    Ok(reply.success(collection, ""))
}

/// GET /api/v1/users/{id}
///
/// A single user. Unknown ids fail with a translated `404`.
pub async fn get_user(
    reply: Reply,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let user = state.users.find(id)?;
    Ok(reply.success(Resource::new(UserResource(user)), ""))
}

/// POST /api/v1/users
///
/// Validate the input and echo the record it would create with `201` and a
/// `Location` header.
pub async fn create_user(
    reply: Reply,
    State(state): State<AppState>,
    input: Result<Json<CreateUser>, JsonRejection>,
) -> AppResult<Response> {
    let Json(input) = input?;
    input.validate()?;

    let user = state.users.draft(input);
    let location = format!("/api/v1/users/{}", user.id);
    tracing::info!(user_id = user.id, "User drafted");

    let mut additional = Map::new();
    additional.insert("persisted".into(), json!(false));

    Ok(reply.created(
        Resource::new(UserResource(user)).additional(additional),
        "",
        Some(&location),
    ))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// GET /api/v1/me
///
/// Echo the authenticated caller. Requires a Bearer token.
pub async fn me(auth: AuthUser, reply: Reply) -> Response {
    let masked = format!("{}***", auth.token.chars().take(4).collect::<String>());
    reply.success(json!({ "authenticated": true, "token": masked }), "")
}
