//! Link status and the stats snapshot.
//!
//! The bridge controller keeps a [`LinkStatus`] handle up to date; the status
//! reporter composes it with the storage facade into the point-in-time JSON
//! document served at `/stats`. The reporter is read-only and safe to call
//! concurrently with the bridge paths.

use crate::listing::{list_tree, DirectoryNode};
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

// ----------------------------------------------------------------------------
// Link Status
// ----------------------------------------------------------------------------

/// Mutable link-health state shared between the bridge and the reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStatus {
    /// Name of the network the bridge is attached to.
    pub hotspot: String,
    /// Address clients reach the bridge at.
    pub ip: String,
    /// Signal quality metric, dBm. Zero when no collaborator reports one.
    pub rssi: i32,
    /// Whether the serial link is currently open.
    pub serial_up: bool,
    /// Number of currently registered real-time clients.
    pub connected_clients: usize,
}

impl LinkStatus {
    pub fn new(hotspot: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            hotspot: hotspot.into(),
            ip: ip.into(),
            rssi: 0,
            serial_up: false,
            connected_clients: 0,
        }
    }

    pub fn shared(self) -> SharedLinkStatus {
        Arc::new(RwLock::new(self))
    }
}

/// Handle to the link status, passed to whoever needs to read or update it.
pub type SharedLinkStatus = Arc<RwLock<LinkStatus>>;

// ----------------------------------------------------------------------------
// Status Snapshot
// ----------------------------------------------------------------------------

/// Point-in-time stats document.
///
/// Field names and the decimal-string `rssi` match the wire format the
/// dashboard already consumes.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    #[serde(rename = "totalSize")]
    pub total_size: u64,
    pub hotspot: String,
    pub rssi: String,
    pub ip: String,
    pub files: Vec<DirectoryNode>,
}

/// Composes the stats snapshot from the storage facade and link status.
#[derive(Clone)]
pub struct StatusReporter {
    storage: Arc<dyn Storage>,
    link: SharedLinkStatus,
}

impl StatusReporter {
    pub fn new(storage: Arc<dyn Storage>, link: SharedLinkStatus) -> Self {
        Self { storage, link }
    }

    /// Build a snapshot. Read-only; listing failures degrade to an empty
    /// `files` array rather than an error.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let link = self.link.read().await.clone();
        let files = list_tree(self.storage.as_ref(), "/").await;
        StatusSnapshot {
            total_size: self.storage.capacity_bytes(),
            hotspot: link.hotspot,
            rssi: link.rssi.to_string(),
            ip: link.ip,
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;

    #[tokio::test]
    async fn snapshot_carries_link_fields_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FsStorage::open(dir.path(), 4096).await.unwrap());
        storage.create("idx.html").await.unwrap();
        storage.append("idx.html", b"<html>").await.unwrap();

        let link = LinkStatus::new("yard-net", "10.0.0.2").shared();
        {
            let mut guard = link.write().await;
            guard.rssi = -51;
        }

        let reporter = StatusReporter::new(storage, link);
        let snapshot = reporter.snapshot().await;

        assert_eq!(snapshot.total_size, 4096);
        assert_eq!(snapshot.hotspot, "yard-net");
        assert_eq!(snapshot.rssi, "-51");
        assert_eq!(snapshot.ip, "10.0.0.2");
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].size, Some(6));
    }

    #[tokio::test]
    async fn snapshot_serializes_with_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FsStorage::open(dir.path(), 1).await.unwrap());
        let link = LinkStatus::new("net", "127.0.0.1").shared();
        let reporter = StatusReporter::new(storage, link);

        let json = serde_json::to_value(reporter.snapshot().await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalSize": 1,
                "hotspot": "net",
                "rssi": "0",
                "ip": "127.0.0.1",
                "files": [],
            })
        );
    }
}
