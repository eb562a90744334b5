use std::sync::Arc;

use axum::extract::FromRef;
use envelope_core::config::ResponseConfig;

use crate::config::ServerConfig;
use crate::exception::ExceptionTranslator;
use crate::users::UserDirectory;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind `Arc`). `FromRef` lets
/// extractors such as [`Reply`](crate::reply::Reply) pull out just the part
/// they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Envelope formatting configuration (shared with `config.response`).
    pub response: Arc<ResponseConfig>,
    /// Failure renderer used by the translation middleware.
    pub translator: Arc<ExceptionTranslator>,
    /// Read-only user fixtures served by the demo routes.
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let response = Arc::new(config.response.clone());
        let translator = Arc::new(ExceptionTranslator::new(
            Arc::clone(&response),
            config.login_path.clone(),
        ));

        Self {
            config: Arc::new(config),
            response,
            translator,
            users: Arc::new(UserDirectory::seeded()),
        }
    }
}
