//! In-memory filesystem implementation.

use hostsim_types::{DirEntry, FileKind, FileStat, FsError, FsResult, Uri};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Entry in the store.
#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8>, modified: SystemTime },
    Directory { modified: SystemTime },
}

impl Node {
    fn file(data: Vec<u8>) -> Self {
        Node::File {
            data,
            modified: SystemTime::now(),
        }
    }

    fn directory() -> Self {
        Node::Directory {
            modified: SystemTime::now(),
        }
    }

    fn kind(&self) -> FileKind {
        match self {
            Node::File { .. } => FileKind::File,
            Node::Directory { .. } => FileKind::Directory,
        }
    }

    fn stat(&self) -> FileStat {
        let (size, modified) = match self {
            Node::File { data, modified } => (data.len() as u64, *modified),
            Node::Directory { modified } => (0, *modified),
        };
        FileStat {
            kind: self.kind(),
            size,
            mtime_ms: modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// The in-memory virtual filesystem.
///
/// Operations are `async` to match the host's calling convention but execute
/// synchronously against the locked map before resolving, so calls against
/// one store resolve in call order. The store is owned by exactly one kernel
/// instance; multiple kernels in one process never share state.
#[derive(Debug)]
pub struct VirtualFs {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFs {
    /// Create a new store containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::directory());
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    // A poisoned lock only means a prior panic mid-operation; the map is
    // still coherent, so recover it rather than surfacing a new failure.
    fn read_nodes(&self) -> RwLockReadGuard<'_, BTreeMap<String, Node>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Node>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Report a node's kind, size, and mtime.
    pub async fn stat(&self, uri: &Uri) -> FsResult<FileStat> {
        let nodes = self.read_nodes();
        nodes
            .get(uri.as_str())
            .map(Node::stat)
            .ok_or_else(|| FsError::FileNotFound(uri.as_str().to_string()))
    }

    /// Read a file's raw bytes.
    ///
    /// Directory nodes carry no content and read as empty, mirroring the
    /// host's flat store.
    pub async fn read_file(&self, uri: &Uri) -> FsResult<Vec<u8>> {
        let nodes = self.read_nodes();
        match nodes.get(uri.as_str()) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Ok(Vec::new()),
            None => Err(FsError::FileNotFound(uri.as_str().to_string())),
        }
    }

    /// Read a file decoded as UTF-8.
    pub async fn read_file_to_string(&self, uri: &Uri) -> FsResult<String> {
        let bytes = self.read_file(uri).await?;
        String::from_utf8(bytes).map_err(|_| FsError::NotUtf8(uri.as_str().to_string()))
    }

    /// Create or overwrite a file node.
    ///
    /// Only the leaf entry is established: missing intermediate directories
    /// are NOT created, and their absence does not fail the write. Whatever
    /// previously occupied the path is replaced.
    #[tracing::instrument(level = "debug", skip(self, content), fields(path = %uri))]
    pub async fn write_file(&self, uri: &Uri, content: impl Into<Vec<u8>>) -> FsResult<()> {
        let mut nodes = self.write_nodes();
        nodes.insert(uri.as_str().to_string(), Node::file(content.into()));
        Ok(())
    }

    /// Create a directory, synthesizing missing ancestors.
    ///
    /// Idempotent over an existing directory; a file node at the path (or at
    /// any ancestor) is a conflict.
    #[tracing::instrument(level = "debug", skip(self), fields(path = %uri))]
    pub async fn create_directory(&self, uri: &Uri) -> FsResult<()> {
        let mut nodes = self.write_nodes();

        for ancestor in ancestors_of(uri.as_str()) {
            match nodes.get(ancestor) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(FsError::FileExists(ancestor.to_string()));
                }
                None => {
                    nodes.insert(ancestor.to_string(), Node::directory());
                }
            }
        }

        match nodes.get(uri.as_str()) {
            Some(Node::Directory { .. }) => Ok(()),
            Some(Node::File { .. }) => Err(FsError::FileExists(uri.as_str().to_string())),
            None => {
                nodes.insert(uri.as_str().to_string(), Node::directory());
                Ok(())
            }
        }
    }

    /// List a directory's immediate children.
    ///
    /// A missing path lists as empty; a file at the path is an error. This
    /// asymmetry is part of the host contract.
    pub async fn read_directory(&self, uri: &Uri) -> FsResult<Vec<DirEntry>> {
        let nodes = self.read_nodes();

        match nodes.get(uri.as_str()) {
            None => return Ok(Vec::new()),
            Some(Node::File { .. }) => {
                return Err(FsError::DirectoryNotFound(uri.as_str().to_string()));
            }
            Some(Node::Directory { .. }) => {}
        }

        let prefix = if uri.is_root() {
            "/".to_string()
        } else {
            format!("{}/", uri.as_str())
        };

        // BTreeMap iteration is key-ordered, so entries come out name-sorted.
        let entries = nodes
            .iter()
            .filter(|(path, _)| path.as_str() != uri.as_str())
            .filter_map(|(path, node)| {
                let rest = path.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(DirEntry {
                    name: rest.to_string(),
                    kind: node.kind(),
                })
            })
            .collect();

        Ok(entries)
    }

    /// Remove the node entry at the path.
    ///
    /// Non-recursive: deleting a directory removes only its own entry, and
    /// any children remain reachable at their old paths.
    #[tracing::instrument(level = "debug", skip(self), fields(path = %uri))]
    pub async fn delete(&self, uri: &Uri) -> FsResult<()> {
        let mut nodes = self.write_nodes();
        nodes
            .remove(uri.as_str())
            .map(|_| ())
            .ok_or_else(|| FsError::FileNotFound(uri.as_str().to_string()))
    }

    /// Copy a node to a new path.
    ///
    /// For a file the bytes are copied. For a directory only the top-level
    /// entry is copied — children are NOT copied. The host behaves this way
    /// and callers' tests exercise it; do not make this recursive.
    #[tracing::instrument(level = "debug", skip(self), fields(from = %source, to = %destination))]
    pub async fn copy(&self, source: &Uri, destination: &Uri) -> FsResult<()> {
        let mut nodes = self.write_nodes();
        let node = nodes
            .get(source.as_str())
            .ok_or_else(|| FsError::FileNotFound(source.as_str().to_string()))?;

        let copied = match node {
            Node::File { data, .. } => Node::file(data.clone()),
            Node::Directory { .. } => Node::directory(),
        };
        nodes.insert(destination.as_str().to_string(), copied);
        Ok(())
    }

    /// Move a node to a new path.
    ///
    /// Same shallow scope as `copy`, followed by removal of the source
    /// entry: a renamed directory's children stay under the old path.
    #[tracing::instrument(level = "debug", skip(self), fields(from = %source, to = %destination))]
    pub async fn rename(&self, source: &Uri, destination: &Uri) -> FsResult<()> {
        let mut nodes = self.write_nodes();
        let node = nodes
            .remove(source.as_str())
            .ok_or_else(|| FsError::FileNotFound(source.as_str().to_string()))?;
        nodes.insert(destination.as_str().to_string(), node);
        Ok(())
    }

    /// Check if a node exists at the path.
    pub async fn exists(&self, uri: &Uri) -> bool {
        self.read_nodes().contains_key(uri.as_str())
    }

    /// Empty the store back to a bare root.
    pub async fn reset(&self) {
        let mut nodes = self.write_nodes();
        nodes.clear();
        nodes.insert("/".to_string(), Node::directory());
    }
}

/// Proper ancestors of a normalized path, outermost first, excluding the
/// path itself. `/a/b/c` yields `/`, `/a`, `/a/b`.
fn ancestors_of(path: &str) -> Vec<&str> {
    let mut ancestors = vec!["/"];
    for (idx, ch) in path.char_indices().skip(1) {
        if ch == '/' {
            ancestors.push(&path[..idx]);
        }
    }
    ancestors
}
