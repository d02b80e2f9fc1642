//! API handlers for cubby.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;

use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{LimitsConfig, SecurityConfig};
use crate::file::FileService;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Token lifecycle manager.
    pub tokens: Arc<TokenService>,
    /// File storage manager.
    pub files: FileService,
    /// Upload and listing limits.
    pub limits: LimitsConfig,
    /// Name of the refresh-token cookie.
    pub refresh_cookie_name: String,
    /// Expected length of system names in path parameters.
    pub system_name_length: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        files: FileService,
        security: &SecurityConfig,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenService::new(security)),
            files,
            limits: limits.clone(),
            refresh_cookie_name: security.refresh_token_cookie_name.clone(),
            system_name_length: security.system_name_length,
        }
    }
}
