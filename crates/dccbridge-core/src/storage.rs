//! Storage facade over the blob namespace.
//!
//! The bridge core never touches the filesystem directly; the directory
//! lister, upload receiver and status reporter all go through the [`Storage`]
//! trait. [`FsStorage`] is the production implementation, rooted at a
//! directory and refusing paths that escape it.

use crate::errors::StorageError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

// ----------------------------------------------------------------------------
// Blob Metadata
// ----------------------------------------------------------------------------

/// Kind of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Regular,
    Directory,
}

/// Metadata for one immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub name: String,
    pub size: u64,
    pub kind: BlobKind,
}

// ----------------------------------------------------------------------------
// Storage Trait
// ----------------------------------------------------------------------------

/// Uniform read/write/delete/enumerate operations over named blobs.
///
/// Paths are `/`-delimited and relative to the namespace root. All
/// implementations must treat deleting an absent blob as success.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the blob at `path`, replacing any previous content.
    async fn create(&self, path: &str) -> Result<(), StorageError>;

    /// Append a chunk to an existing blob.
    async fn append(&self, path: &str, chunk: &[u8]) -> Result<(), StorageError>;

    /// Read a blob's full content.
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove a blob. Removing an absent blob is a no-op success.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Enumerate the immediate children of a directory, in whatever order
    /// the backend yields them. A missing directory yields an error; callers
    /// that want degradation handle it (see the directory lister).
    async fn list(&self, path: &str) -> Result<Vec<BlobMeta>, StorageError>;

    /// Advertised total capacity of the namespace, in bytes.
    fn capacity_bytes(&self) -> u64;
}

// ----------------------------------------------------------------------------
// Filesystem Implementation
// ----------------------------------------------------------------------------

/// Filesystem-backed storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    capacity_bytes: u64,
}

impl FsStorage {
    /// Open (and create if needed) a storage namespace at `root`.
    pub async fn open(root: impl Into<PathBuf>, capacity_bytes: u64) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Io {
                path: root.display().to_string(),
                source,
            })?;
        Ok(Self {
            root,
            capacity_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a namespace path against the root, rejecting escapes.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let trimmed = path.trim_start_matches('/');
        let relative = Path::new(trimmed);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(StorageError::InvalidName {
                        name: path.to_string(),
                    })
                }
            }
        }
        Ok(self.root.join(relative))
    }

    fn io_err(path: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_string(),
            source,
        }
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn create(&self, path: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_err(path, e))?;
        }
        tokio::fs::File::create(&resolved)
            .await
            .map_err(|e| Self::io_err(path, e))?;
        Ok(())
    }

    async fn append(&self, path: &str, chunk: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&resolved)
            .await
            .map_err(|e| Self::io_err(path, e))?;
        file.write_all(chunk)
            .await
            .map_err(|e| Self::io_err(path, e))?;
        file.flush().await.map_err(|e| Self::io_err(path, e))?;
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        match tokio::fs::read(&resolved).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(Self::io_err(path, e)),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        match tokio::fs::remove_file(&resolved).await {
            Ok(()) => Ok(()),
            // Idempotent: deleting what isn't there is success.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(path, e)),
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<BlobMeta>, StorageError> {
        let resolved = self.resolve(path)?;
        let mut dir = tokio::fs::read_dir(&resolved)
            .await
            .map_err(|e| Self::io_err(path, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| Self::io_err(path, e))? {
            let meta = entry.metadata().await.map_err(|e| Self::io_err(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(BlobMeta {
                name,
                size: meta.len(),
                kind: if meta.is_dir() {
                    BlobKind::Directory
                } else {
                    BlobKind::Regular
                },
            });
        }
        Ok(entries)
    }

    fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }
}
