//! Directory lister.
//!
//! Walks the storage namespace and renders it as a nested [`DirectoryNode`]
//! tree. The tree is structured data; serialization to the wire format
//! happens at the HTTP boundary, so an empty directory serializes to a valid
//! empty array with no trailing-separator artifact.

use crate::storage::{BlobKind, Storage};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

// ----------------------------------------------------------------------------
// Directory Node
// ----------------------------------------------------------------------------

/// One node of the listing tree: a regular blob (`size`) or a directory
/// (`children`), mirroring the namespace at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryNode>>,
}

impl DirectoryNode {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size: Some(size),
            children: None,
        }
    }

    pub fn directory(name: impl Into<String>, children: Vec<DirectoryNode>) -> Self {
        Self {
            name: name.into(),
            size: None,
            children: Some(children),
        }
    }
}

// ----------------------------------------------------------------------------
// Lister
// ----------------------------------------------------------------------------

/// List the children of `path`, recursing into subdirectories.
///
/// Enumeration order is whatever the storage facade yields. A path that does
/// not exist or cannot be opened degrades to an empty listing; it never
/// aborts the caller.
pub async fn list_tree(storage: &dyn Storage, path: &str) -> Vec<DirectoryNode> {
    walk(storage, path.to_string()).await
}

fn walk<'a>(
    storage: &'a dyn Storage,
    path: String,
) -> Pin<Box<dyn Future<Output = Vec<DirectoryNode>> + Send + 'a>> {
    Box::pin(async move {
        let entries = match storage.list(&path).await {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.kind {
                BlobKind::Directory => {
                    let child_path = join_path(&path, &entry.name);
                    let children = walk(storage, child_path).await;
                    nodes.push(DirectoryNode::directory(entry.name, children));
                }
                BlobKind::Regular => {
                    nodes.push(DirectoryNode::file(entry.name, entry.size));
                }
            }
        }
        nodes
    })
}

fn join_path(base: &str, name: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", trimmed, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;

    async fn write_blob(storage: &FsStorage, path: &str, content: &[u8]) {
        storage.create(path).await.unwrap();
        storage.append(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn empty_directory_is_a_valid_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::open(dir.path(), 0).await.unwrap();

        let nodes = list_tree(&storage, "/").await;
        assert!(nodes.is_empty());
        assert_eq!(serde_json::to_string(&nodes).unwrap(), "[]");
    }

    #[tokio::test]
    async fn missing_path_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::open(dir.path(), 0).await.unwrap();
        assert!(list_tree(&storage, "no/such/dir").await.is_empty());
    }

    #[tokio::test]
    async fn nested_tree_preserves_depth_and_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::open(dir.path(), 0).await.unwrap();

        write_blob(&storage, "top.txt", b"12345").await;
        write_blob(&storage, "a/one.bin", &[0u8; 10]).await;
        write_blob(&storage, "a/b/two.bin", &[0u8; 20]).await;
        write_blob(&storage, "a/b/c/three.bin", &[0u8; 30]).await;
        write_blob(&storage, "a/b/c/four.bin", &[0u8; 40]).await;

        let mut nodes = list_tree(&storage, "/").await;
        nodes.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(nodes.len(), 2);

        let a = &nodes[0];
        assert_eq!(a.name, "a");
        assert!(a.size.is_none());
        let mut a_children = a.children.clone().unwrap();
        a_children.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(a_children[1].name, "one.bin");
        assert_eq!(a_children[1].size, Some(10));

        let b = &a_children[0];
        assert_eq!(b.name, "b");
        let b_children = b.children.clone().unwrap();
        let c = b_children.iter().find(|n| n.name == "c").unwrap();
        let mut c_children = c.children.clone().unwrap();
        c_children.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(c_children[0].size, Some(40));
        assert_eq!(c_children[1].size, Some(30));

        assert_eq!(nodes[1].name, "top.txt");
        assert_eq!(nodes[1].size, Some(5));
    }

    #[test]
    fn files_serialize_without_children_key() {
        let json = serde_json::to_value(DirectoryNode::file("x", 3)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "x", "size": 3}));

        let json = serde_json::to_value(DirectoryNode::directory("d", Vec::new())).unwrap();
        assert_eq!(json, serde_json::json!({"name": "d", "children": []}));
    }
}
