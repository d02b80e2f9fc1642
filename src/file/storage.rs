//! Disk-backed blob store for cubby.
//!
//! Blobs live under `<root>/<user_id>/<system_name>`, where the system name
//! is a fixed-length random hex string decoupled from the client-supplied
//! file name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand_core::{OsRng, RngCore};

use crate::{CubbyError, Result};

/// Blob store managing physical files under a shared root, namespaced by
/// owning-user directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Root directory for all user files.
    root: PathBuf,
    /// Length in hex characters of generated system names.
    system_name_length: usize,
}

impl BlobStore {
    /// Create a new BlobStore with the given root path.
    ///
    /// The root directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>, system_name_length: usize) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            system_name_length,
        })
    }

    /// Get the root path of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a new random system name.
    ///
    /// Draws `system_name_length / 2` bytes from the OS random source and
    /// renders them as exactly `system_name_length` hex characters.
    pub fn generate_system_name(&self) -> String {
        let mut bytes = vec![0u8; self.system_name_length / 2];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Save content under a freshly generated system name.
    ///
    /// Ensures the user's directory exists, writes the blob, and returns
    /// `(system_name, relative_path)`.
    pub fn save(&self, user_id: i64, content: &[u8]) -> Result<(String, String)> {
        let system_name = self.generate_system_name();
        let rel_path = format!("{}/{}", user_id, system_name);

        let user_dir = self.root.join(user_id.to_string());
        fs::create_dir_all(&user_dir)?;

        fs::write(user_dir.join(&system_name), content)?;

        Ok((system_name, rel_path))
    }

    /// Load a blob by its relative path.
    ///
    /// A missing file is reported as `BlobMissing`: callers only hold a
    /// relative path through a live metadata record, so absence here means
    /// the store and the records have diverged.
    pub fn load(&self, rel_path: &str) -> Result<Vec<u8>> {
        match fs::read(self.full_path(rel_path)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CubbyError::BlobMissing(rel_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob by its relative path.
    ///
    /// Returns `true` if the blob was deleted, `false` if it didn't exist.
    pub fn delete(&self, rel_path: &str) -> Result<bool> {
        match fs::remove_file(self.full_path(rel_path)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists.
    pub fn exists(&self, rel_path: &str) -> bool {
        self.full_path(rel_path).exists()
    }

    /// Absolute path for a relative blob path.
    fn full_path(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }
}
