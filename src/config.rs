//! Configuration module for cubby.

use serde::Deserialize;
use std::path::Path;

use crate::{CubbyError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means permissive (development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3355
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/cubby.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for user file storage.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

fn default_storage_root() -> String {
    "data/users_files".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Token and credential configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret for signing access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: u64,
    /// Secret for signing refresh tokens.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Name of the cookie carrying the refresh token.
    #[serde(default = "default_refresh_cookie_name")]
    pub refresh_token_cookie_name: String,
    /// Length in hex characters of generated system names.
    #[serde(default = "default_system_name_length")]
    pub system_name_length: usize,
}

fn default_access_secret() -> String {
    "change-me".to_string()
}

fn default_access_expiry() -> u64 {
    600
}

fn default_refresh_secret() -> String {
    "change-me-too".to_string()
}

fn default_refresh_cookie_name() -> String {
    "refreshToken".to_string()
}

fn default_system_name_length() -> usize {
    64
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            access_token_expiry_secs: default_access_expiry(),
            refresh_token_secret: default_refresh_secret(),
            refresh_token_cookie_name: default_refresh_cookie_name(),
            system_name_length: default_system_name_length(),
        }
    }
}

/// Upload and listing limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_bytes: u64,
    /// MIME types accepted for uploads.
    #[serde(default = "default_acceptable_mime_types")]
    pub acceptable_mime_types: Vec<String>,
    /// Maximum page size for file listings.
    #[serde(default = "default_max_files_list")]
    pub max_files_list: u32,
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}

fn default_acceptable_mime_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "application/msword".to_string(),
        "application/zip".to_string(),
    ]
}

fn default_max_files_list() -> u32 {
    100
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: default_max_upload_size(),
            acceptable_mime_types: default_acceptable_mime_types(),
            max_files_list: default_max_files_list(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. Empty disables file logging.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Token and credential settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Upload and listing limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| CubbyError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3355);
        assert_eq!(config.security.access_token_expiry_secs, 600);
        assert_eq!(config.security.system_name_length, 64);
        assert_eq!(config.limits.max_upload_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.limits.max_files_list, 100);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
            [server]
            port = 8080

            [limits]
            max_files_list = 25
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_files_list, 25);
        // Unspecified sections fall back to defaults
        assert_eq!(config.security.refresh_token_cookie_name, "refreshToken");
        assert_eq!(
            config.limits.acceptable_mime_types,
            vec!["image/jpeg", "application/msword", "application/zip"]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/config.toml");
        assert!(result.is_err());
    }
}
