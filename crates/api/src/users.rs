//! User fixtures backing the demonstration routes.
//!
//! The directory is immutable after startup; creating a user validates the
//! input and echoes the would-be record without storing it.

use envelope_core::error::CoreError;
use envelope_core::pagination::Page;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use validator::Validate;

use crate::payload::JsonResource;
use crate::request::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "The name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    pub role: Option<String>,
}

/// Public presentation of a [`User`].
#[derive(Debug, Clone)]
pub struct UserResource(pub User);

impl JsonResource for UserResource {
    fn resolve(&self, _request: &RequestContext) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.0.id));
        map.insert("name".into(), json!(self.0.name));
        map.insert("email".into(), json!(self.0.email));
        map.insert("role".into(), json!(self.0.role));
        map
    }

    fn with(&self, _request: &RequestContext) -> Map<String, Value> {
        let mut links = Map::new();
        links.insert("links".into(), json!({ "self": format!("/api/v1/users/{}", self.0.id) }));
        links
    }

    fn original(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}

/// Read-only user store.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// A small fixed roster for local runs and tests.
    pub fn seeded() -> Self {
        let roster = [
            ("Ada Lovelace", "ada@example.com", "admin"),
            ("Grace Hopper", "grace@example.com", "editor"),
            ("Alan Turing", "alan@example.com", "editor"),
            ("Katherine Johnson", "katherine@example.com", "viewer"),
            ("Edsger Dijkstra", "edsger@example.com", "viewer"),
        ];
        Self::new(
            roster
                .iter()
                .zip(1..)
                .map(|((name, email, role), id)| User {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    role: role.to_string(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find(&self, id: u64) -> Result<User, CoreError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "User",
                id: id.to_string(),
            })
    }

    /// One page of users ordered by id.
    pub fn page(&self, page: u64, per_page: u64, path: &str) -> Page<User> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let skip = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);

        let items = self.users.iter().skip(skip).take(take).cloned().collect();
        Page::new(items, self.users.len() as u64, per_page, page, path)
    }

    /// The record a create request would produce.
    pub fn draft(&self, input: CreateUser) -> User {
        let next_id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        User {
            id: next_id,
            name: input.name,
            email: input.email,
            role: input.role.unwrap_or_else(|| "viewer".into()),
        }
    }
}
