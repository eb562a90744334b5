//! Envelope API server library.
//!
//! Exposes the response building blocks (reply entry points, payload shapes,
//! exception translation) together with the demo server's config, state and
//! routes so integration tests and the binary entrypoint can both access
//! them.

pub mod config;
pub mod error;
pub mod exception;
pub mod handlers;
pub mod middleware;
pub mod payload;
pub mod query;
pub mod reply;
pub mod request;
pub mod responder;
pub mod router;
pub mod routes;
pub mod state;
pub mod users;
