//! Response envelope engine.
//!
//! Everything in this crate is transport-agnostic: it turns payloads,
//! messages and numeric statuses into [`envelope::Envelope`] values using a
//! read-only [`config::ResponseConfig`]. The axum integration lives in the
//! `envelope-api` crate.

pub mod config;
pub mod envelope;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pagination;
pub mod status;
