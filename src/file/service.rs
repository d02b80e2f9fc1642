//! File storage manager for cubby.
//!
//! Keeps the disk store and the files table in lock-step. There is no
//! transaction spanning a blob write and a metadata write, so every
//! operation orders the two steps so that a crash in between leaves an
//! orphaned blob (sweepable) rather than a record pointing at nothing.

use sqlx::SqlitePool;
use tracing::warn;

use crate::db::{FileRecord, FileRepository, NewFileRecord};
use crate::file::storage::BlobStore;
use crate::{CubbyError, Result};

/// An upload accepted from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name.
    pub original_name: String,
    /// Declared MIME type.
    pub mime: String,
    /// File content.
    pub content: Vec<u8>,
}

/// Extension of a client-supplied name: everything after the last dot, or
/// the whole name when there is none.
fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_string()
}

/// Manages blob placement and create/replace/delete consistency between the
/// store and FileRecord metadata.
#[derive(Debug, Clone)]
pub struct FileService {
    store: BlobStore,
}

impl FileService {
    /// Create a file service over the given blob store.
    pub fn new(store: BlobStore) -> Self {
        Self { store }
    }

    /// Access the underlying blob store.
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Store a new upload for a user.
    ///
    /// Writes the blob first, then the metadata record. If the record
    /// insert fails, the just-written blob is deleted before the error
    /// surfaces, so no orphan is left behind.
    pub async fn create(&self, pool: &SqlitePool, user_id: i64, upload: Upload) -> Result<FileRecord> {
        let (system_name, rel_path) = self.store.save(user_id, &upload.content)?;

        let record = NewFileRecord {
            path: rel_path.clone(),
            system_name,
            original_name: upload.original_name.clone(),
            size_bytes: upload.content.len() as i64,
            mime: upload.mime,
            extension: extension_of(&upload.original_name),
            user_id,
        };

        match FileRepository::new(pool).create(&record).await {
            Ok(created) => Ok(created),
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&rel_path) {
                    warn!("failed to roll back blob {}: {}", rel_path, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Look up metadata by system name.
    pub async fn metadata(&self, pool: &SqlitePool, system_name: &str) -> Result<FileRecord> {
        FileRepository::new(pool)
            .get_by_system_name(system_name)
            .await?
            .ok_or_else(|| CubbyError::NotFound("file".to_string()))
    }

    /// Load metadata and blob content for a download.
    ///
    /// A record whose blob is gone from disk is a corruption signal and
    /// propagates as `BlobMissing`, never as NotFound.
    pub async fn download(&self, pool: &SqlitePool, system_name: &str) -> Result<(FileRecord, Vec<u8>)> {
        let record = self.metadata(pool, system_name).await?;
        let content = self.store.load(&record.path)?;
        Ok((record, content))
    }

    /// Replace an existing file with a new upload.
    ///
    /// Order: write the new blob, swap the metadata in place, delete the
    /// old blob. At every observable instant at least one valid blob is
    /// reachable from the record. If the old record is not found, the new
    /// blob (written under the caller's user id) is deleted before the
    /// error surfaces.
    pub async fn replace(
        &self,
        pool: &SqlitePool,
        user_id: i64,
        old_system_name: &str,
        upload: Upload,
    ) -> Result<FileRecord> {
        let (system_name, rel_path) = self.store.save(user_id, &upload.content)?;

        let repo = FileRepository::new(pool);

        let rollback_new = |err: CubbyError| {
            if let Err(cleanup) = self.store.delete(&rel_path) {
                warn!("failed to roll back blob {}: {}", rel_path, cleanup);
            }
            err
        };

        let old = match repo.get_by_system_name(old_system_name).await {
            Ok(Some(old)) => old,
            Ok(None) => return Err(rollback_new(CubbyError::NotFound("file".to_string()))),
            Err(e) => return Err(rollback_new(e)),
        };

        let record = NewFileRecord {
            path: rel_path.clone(),
            system_name,
            original_name: upload.original_name.clone(),
            size_bytes: upload.content.len() as i64,
            mime: upload.mime,
            extension: extension_of(&upload.original_name),
            user_id,
        };

        let updated = match repo.update_by_id(old.id, &record).await {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(rollback_new(CubbyError::NotFound("file".to_string()))),
            Err(e) => return Err(rollback_new(e)),
        };

        // Metadata now points at the new blob; the old one is unreferenced
        match self.store.delete(&old.path) {
            Ok(true) => {}
            Ok(false) => warn!("old blob {} was already gone", old.path),
            Err(e) => warn!("failed to delete old blob {}: {}", old.path, e),
        }

        Ok(updated)
    }

    /// Delete a file: metadata first, then the blob at the path the deleted
    /// row recorded. A crash (or failure) after the metadata delete leaves
    /// an orphaned blob, which is sweepable; the request still succeeds.
    pub async fn delete(&self, pool: &SqlitePool, system_name: &str) -> Result<()> {
        let path = FileRepository::new(pool)
            .delete_by_system_name(system_name)
            .await?
            .ok_or_else(|| CubbyError::NotFound("file".to_string()))?;

        match self.store.delete(&path) {
            Ok(true) => {}
            Ok(false) => warn!("blob {} was already gone", path),
            Err(e) => warn!("failed to delete blob {}: {}", path, e),
        }

        Ok(())
    }

    /// List file metadata, newest first.
    pub async fn list(&self, pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<FileRecord>> {
        FileRepository::new(pool).list(offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database, FileService) {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::new(temp_dir.path(), 64).unwrap();
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO users (email, password_hash) VALUES ('t@t.com', 'hash')")
            .execute(db.pool())
            .await
            .unwrap();
        (temp_dir, db, FileService::new(store))
    }

    fn jpeg_upload(content: &[u8]) -> Upload {
        Upload {
            original_name: "photo.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.jpg"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        // Dotless names keep the whole name, as the wire format records it
        assert_eq!(extension_of("README"), "README");
    }

    #[tokio::test]
    async fn test_create_writes_blob_and_record() {
        let (_tmp, db, service) = setup().await;

        let record = service
            .create(db.pool(), 1, jpeg_upload(b"0123456789"))
            .await
            .unwrap();

        assert_eq!(record.size_bytes, 10);
        assert_eq!(record.system_name.len(), 64);
        assert_eq!(record.path, format!("1/{}", record.system_name));
        assert!(service.store().exists(&record.path));
    }

    #[tokio::test]
    async fn test_create_rolls_back_blob_on_metadata_failure() {
        let (_tmp, db, service) = setup().await;

        // A record insert against a missing user violates the foreign key
        let result = service.create(db.pool(), 99, jpeg_upload(b"data")).await;
        assert!(result.is_err());

        // The blob written before the failed insert must be gone
        let user_dir = service.store().root().join("99");
        let leftovers = std::fs::read_dir(&user_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_download_round_trip() {
        let (_tmp, db, service) = setup().await;

        let content = b"uploaded bytes";
        let record = service
            .create(db.pool(), 1, jpeg_upload(content))
            .await
            .unwrap();

        let (meta, bytes) = service.download(db.pool(), &record.system_name).await.unwrap();
        assert_eq!(bytes, content);
        assert_eq!(meta.size_bytes, content.len() as i64);
        assert_eq!(meta.mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_download_missing_record_is_not_found() {
        let (_tmp, db, service) = setup().await;

        let result = service.download(db.pool(), "no-such-name").await;
        assert!(matches!(result, Err(CubbyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_missing_blob_is_corruption() {
        let (_tmp, db, service) = setup().await;

        let record = service
            .create(db.pool(), 1, jpeg_upload(b"data"))
            .await
            .unwrap();

        // Remove the blob behind the record's back
        service.store().delete(&record.path).unwrap();

        let result = service.download(db.pool(), &record.system_name).await;
        assert!(matches!(result, Err(CubbyError::BlobMissing(_))));
    }

    #[tokio::test]
    async fn test_replace_swaps_blob_and_keeps_id() {
        let (_tmp, db, service) = setup().await;

        let original = service
            .create(db.pool(), 1, jpeg_upload(b"old content"))
            .await
            .unwrap();

        let replacement = Upload {
            original_name: "new.zip".to_string(),
            mime: "application/zip".to_string(),
            content: b"new content!".to_vec(),
        };
        let updated = service
            .replace(db.pool(), 1, &original.system_name, replacement)
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_ne!(updated.system_name, original.system_name);
        assert_eq!(updated.mime, "application/zip");
        assert_eq!(updated.extension, "zip");

        // New blob reachable, old blob gone
        assert!(service.store().exists(&updated.path));
        assert!(!service.store().exists(&original.path));

        let (_, bytes) = service.download(db.pool(), &updated.system_name).await.unwrap();
        assert_eq!(bytes, b"new content!");
    }

    #[tokio::test]
    async fn test_replace_unknown_record_rolls_back_new_blob() {
        let (_tmp, db, service) = setup().await;

        let result = service
            .replace(db.pool(), 1, "no-such-name", jpeg_upload(b"data"))
            .await;
        assert!(matches!(result, Err(CubbyError::NotFound(_))));

        // The just-written blob under the caller's directory was removed
        let user_dir = service.store().root().join("1");
        let leftovers = std::fs::read_dir(&user_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_record_then_blob() {
        let (_tmp, db, service) = setup().await;

        let record = service
            .create(db.pool(), 1, jpeg_upload(b"data"))
            .await
            .unwrap();

        service.delete(db.pool(), &record.system_name).await.unwrap();

        assert!(!service.store().exists(&record.path));
        let result = service.metadata(db.pool(), &record.system_name).await;
        assert!(matches!(result, Err(CubbyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let (_tmp, db, service) = setup().await;

        let result = service.delete(db.pool(), "no-such-name").await;
        assert!(matches!(result, Err(CubbyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_blob_already_gone() {
        let (_tmp, db, service) = setup().await;

        let record = service
            .create(db.pool(), 1, jpeg_upload(b"data"))
            .await
            .unwrap();
        service.store().delete(&record.path).unwrap();

        // Metadata-first ordering: the record delete still wins
        service.delete(db.pool(), &record.system_name).await.unwrap();
        let result = service.metadata(db.pool(), &record.system_name).await;
        assert!(matches!(result, Err(CubbyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (_tmp, db, service) = setup().await;

        for i in 0..4 {
            service
                .create(db.pool(), 1, jpeg_upload(format!("file {}", i).as_bytes()))
                .await
                .unwrap();
        }

        let page = service.list(db.pool(), 0, 3).await.unwrap();
        assert_eq!(page.len(), 3);

        let rest = service.list(db.pool(), 3, 3).await.unwrap();
        assert_eq!(rest.len(), 1);
    }
}
