//! Database schema and migrations for cubby.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table
    r#"
-- Users table for account authentication
CREATE TABLE users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    email          TEXT UNIQUE,
    phone          TEXT,
    password_hash  TEXT NOT NULL,           -- Argon2 hash
    created_at     TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_phone ON users(phone);
"#,
    // v2: refresh tokens table
    r#"
-- Refresh tokens; validity is row existence, no expiry is modeled
CREATE TABLE refresh_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
"#,
    // v3: file metadata table
    r#"
-- File metadata; system_name is the randomized on-disk identifier
CREATE TABLE files (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    path           TEXT NOT NULL,           -- <user_id>/<system_name>
    system_name    TEXT NOT NULL UNIQUE,
    original_name  TEXT NOT NULL,
    size_bytes     INTEGER NOT NULL,
    mime           TEXT NOT NULL,
    extension      TEXT NOT NULL,
    user_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at     TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at     TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_user_id ON files(user_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
        }
    }
}
