//! cubby - account authentication and per-user file storage service.
//!
//! Issues paired short-lived access tokens and store-backed refresh tokens,
//! and maps opaque user uploads onto a disk-backed object store with
//! randomized names kept consistent with metadata records.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, PasswordError, TokenError, TokenService,
};
pub use config::Config;
pub use db::{Database, FileRecord, FileRepository, NewFileRecord, NewRefreshToken, NewUser,
    RefreshToken, RefreshTokenRepository, User, UserRepository};
pub use error::{CubbyError, Result};
pub use file::{BlobStore, FileService, Upload};
pub use web::WebServer;
