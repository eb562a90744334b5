//! Request extractors that guard routes.
//!
//! - [`auth::AuthUser`] -- Requires a valid Bearer token.

pub mod auth;
