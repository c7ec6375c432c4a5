//! Chunked upload receiver.
//!
//! An [`UploadSink`] writes an inbound byte stream to a newly created blob,
//! one chunk at a time, in delivery order. Completion is explicit; a sink
//! dropped mid-upload leaves a partially written blob behind, which is
//! accepted behavior (no rollback).

use crate::errors::StorageError;
use crate::storage::Storage;
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Upload Sink
// ----------------------------------------------------------------------------

/// Incremental writer for one upload.
pub struct UploadSink {
    storage: Arc<dyn Storage>,
    path: String,
    bytes_written: u64,
    completed: bool,
}

impl UploadSink {
    /// Begin an upload, creating (and truncating) the destination blob.
    pub async fn begin(
        storage: Arc<dyn Storage>,
        path: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let path = path.into();
        storage.create(&path).await?;
        Ok(Self {
            storage,
            path,
            bytes_written: 0,
            completed: false,
        })
    }

    /// Append one chunk in delivery order.
    pub async fn append(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        if self.completed {
            return Err(StorageError::UploadClosed);
        }
        if chunk.is_empty() {
            return Ok(());
        }
        self.storage.append(&self.path, chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Finish the upload and return the number of bytes written.
    pub async fn complete(mut self) -> Result<u64, StorageError> {
        self.completed = true;
        Ok(self.bytes_written)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
