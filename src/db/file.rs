//! File metadata model and repository for cubby.

use sqlx::SqlitePool;

use crate::Result;

/// Metadata row binding a stored blob to its owning user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique record ID.
    pub id: i64,
    /// Storage path relative to the storage root: `<user_id>/<system_name>`.
    pub path: String,
    /// Randomized on-disk identifier, globally unique, fixed length.
    pub system_name: String,
    /// Original client-supplied name.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime: String,
    /// File extension.
    pub extension: String,
    /// Owning user ID.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Data for creating or replacing a file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Storage path relative to the storage root.
    pub path: String,
    /// Randomized on-disk identifier.
    pub system_name: String,
    /// Original client-supplied name.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime: String,
    /// File extension.
    pub extension: String,
    /// Owning user ID.
    pub user_id: i64,
}

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO files (path, system_name, original_name, size_bytes, mime, extension, user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&record.path)
        .bind(&record.system_name)
        .bind(&record.original_name)
        .bind(record.size_bytes)
        .bind(record.mime.as_str())
        .bind(&record.extension)
        .bind(record.user_id)
        .fetch_one(self.pool)
        .await?;

        let created = sqlx::query_as::<_, FileRecord>(
            "SELECT id, path, system_name, original_name, size_bytes, mime, extension, user_id,
                    created_at, updated_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Get a file record by system name.
    pub async fn get_by_system_name(&self, system_name: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, path, system_name, original_name, size_bytes, mime, extension, user_id,
                    created_at, updated_at
             FROM files WHERE system_name = ?",
        )
        .bind(system_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Replace a record's storage fields in place, keeping its identifier.
    ///
    /// Returns the updated record, or None if no row with that ID exists.
    pub async fn update_by_id(&self, id: i64, record: &NewFileRecord) -> Result<Option<FileRecord>> {
        let result = sqlx::query(
            "UPDATE files
             SET path = ?, system_name = ?, original_name = ?, size_bytes = ?, mime = ?,
                 extension = ?, user_id = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&record.path)
        .bind(&record.system_name)
        .bind(&record.original_name)
        .bind(record.size_bytes)
        .bind(record.mime.as_str())
        .bind(&record.extension)
        .bind(record.user_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, FileRecord>(
            "SELECT id, path, system_name, original_name, size_bytes, mime, extension, user_id,
                    created_at, updated_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a file record by system name, returning the stored path of the
    /// deleted row so the caller can remove the blob afterwards.
    pub async fn delete_by_system_name(&self, system_name: &str) -> Result<Option<String>> {
        let path: Option<String> =
            sqlx::query_scalar("DELETE FROM files WHERE system_name = ? RETURNING path")
                .bind(system_name)
                .fetch_optional(self.pool)
                .await?;

        Ok(path)
    }

    /// List file records, newest first.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(
            "SELECT id, path, system_name, original_name, size_bytes, mime, extension, user_id,
                    created_at, updated_at
             FROM files ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO users (email, password_hash) VALUES ('t@t.com', 'hash')")
            .execute(db.pool())
            .await
            .unwrap();
        db
    }

    fn sample_record(system_name: &str) -> NewFileRecord {
        NewFileRecord {
            path: format!("1/{}", system_name),
            system_name: system_name.to_string(),
            original_name: "photo.jpg".to_string(),
            size_bytes: 1024,
            mime: "image/jpeg".to_string(),
            extension: "jpg".to_string(),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let created = repo.create(&sample_record("aaaa")).await.unwrap();
        assert_eq!(created.system_name, "aaaa");
        assert_eq!(created.path, "1/aaaa");
        assert_eq!(created.size_bytes, 1024);

        let fetched = repo.get_by_system_name("aaaa").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        assert!(repo.get_by_system_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_by_id_keeps_identifier() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let created = repo.create(&sample_record("oldname")).await.unwrap();

        let mut replacement = sample_record("newname");
        replacement.original_name = "replacement.zip".to_string();
        replacement.mime = "application/zip".to_string();
        replacement.extension = "zip".to_string();
        replacement.size_bytes = 2048;

        let updated = repo
            .update_by_id(created.id, &replacement)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.system_name, "newname");
        assert_eq!(updated.size_bytes, 2048);

        // The old system name no longer resolves
        assert!(repo.get_by_system_name("oldname").await.unwrap().is_none());
        assert!(repo.get_by_system_name("newname").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let result = repo.update_by_id(999, &sample_record("x")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_path() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        repo.create(&sample_record("bye")).await.unwrap();

        let path = repo.delete_by_system_name("bye").await.unwrap();
        assert_eq!(path.as_deref(), Some("1/bye"));

        // Gone now
        assert!(repo.get_by_system_name("bye").await.unwrap().is_none());
        assert!(repo.delete_by_system_name("bye").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        for i in 0..5 {
            repo.create(&sample_record(&format!("file-{}", i)))
                .await
                .unwrap();
        }

        let first_page = repo.list(0, 2).await.unwrap();
        assert_eq!(first_page.len(), 2);
        // Newest first
        assert_eq!(first_page[0].system_name, "file-4");

        let second_page = repo.list(2, 2).await.unwrap();
        assert_eq!(second_page.len(), 2);
        assert_eq!(second_page[0].system_name, "file-2");

        let past_end = repo.list(10, 2).await.unwrap();
        assert!(past_end.is_empty());
    }
}
