// src/core/mod.rs
pub mod auth;
pub mod config;
pub mod context;
pub mod strength;

use std::sync::Arc;

use crate::core::auth::AuthManager;
use crate::core::config::Config;
use crate::db::Database;
use crate::logging::Logger;
use crate::mailer::Mailer;

/// Everything a request handler needs, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthManager,
    pub mailer: Mailer,
    pub logger: Arc<Logger>,
    pub config: Config,
}
