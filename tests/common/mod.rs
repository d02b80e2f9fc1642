//! Shared test harness for API integration tests.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cubby::config::{LimitsConfig, SecurityConfig};
use cubby::web::handlers::AppState;
use cubby::web::router::create_router;
use cubby::{BlobStore, Database, FileService};

/// Create a test server with an in-memory database and temp-dir storage.
pub async fn create_test_server() -> (TestServer, Arc<Database>, TempDir) {
    create_test_server_with_limits(LimitsConfig::default()).await
}

/// Create a test server with custom upload/listing limits.
pub async fn create_test_server_with_limits(
    limits: LimitsConfig,
) -> (TestServer, Arc<Database>, TempDir) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let temp_dir = TempDir::new().expect("Failed to create storage dir");

    let security = SecurityConfig {
        access_token_secret: "test-access-secret".to_string(),
        refresh_token_secret: "test-refresh-secret".to_string(),
        ..Default::default()
    };

    let store = BlobStore::new(temp_dir.path(), security.system_name_length)
        .expect("Failed to create blob store");

    let app_state = Arc::new(AppState::new(
        db.clone(),
        FileService::new(store),
        &security,
        &limits,
    ));

    let server = TestServer::new(create_router(app_state, &[])).expect("Failed to create server");

    (server, db, temp_dir)
}

/// Sign up a test user and return the response JSON.
pub async fn sign_up(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/signup")
        .json(&json!({
            "email": email,
            "password": password
        }))
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

/// Get the access token from a signup/signin response.
pub fn access_token(response: &Value) -> String {
    response["accessToken"].as_str().unwrap().to_string()
}

/// Bearer header value for an access token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
