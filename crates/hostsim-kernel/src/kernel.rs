//! The host kernel — composition of store and registries.
//!
//! One `HostKernel` is one simulated host instance. Everything it owns is
//! instance state: the store, the document cache, and the editor lists are
//! never shared between kernels, so independent kernels can run side by
//! side in one process (parallel test harnesses).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      HostKernel                      │
//! │  ┌────────────┐  ┌──────────────────┐  ┌──────────┐  │
//! │  │ VirtualFs  │←─│ DocumentRegistry │←─│ Editor   │  │
//! │  │ (nodes)    │  │ (open docs)      │  │ Registry │  │
//! │  └────────────┘  └──────────────────┘  └──────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::documents::DocumentRegistry;
use crate::editors::EditorRegistry;
use crate::vfs::VirtualFs;
use hostsim_types::{FsResult, Uri};
use std::sync::Arc;

/// Configuration for kernel initialization.
#[derive(Debug, Clone, Default)]
pub struct KernelConfig {
    /// Name of this kernel (for identification in logs and tests).
    pub name: String,
    /// Files written into the store at construction, as (path, content).
    seed_files: Vec<(String, Vec<u8>)>,
}

impl KernelConfig {
    /// Create a config with the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seed_files: Vec::new(),
        }
    }

    /// Add a file to write into the store at construction.
    ///
    /// Seeds establish leaf entries only, like any other write; seed
    /// directories explicitly via the VFS if callers list them.
    pub fn with_seed_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.seed_files.push((path.to_string(), content.into()));
        self
    }
}

/// One simulated host instance.
pub struct HostKernel {
    name: String,
    vfs: Arc<VirtualFs>,
    documents: Arc<DocumentRegistry>,
    editors: Arc<EditorRegistry>,
}

impl HostKernel {
    /// Create a kernel from the given configuration.
    #[tracing::instrument(level = "debug", skip(config), fields(name = %config.name))]
    pub async fn new(config: KernelConfig) -> FsResult<Self> {
        let vfs = Arc::new(VirtualFs::new());
        for (path, content) in config.seed_files {
            vfs.write_file(&Uri::file(&path)?, content).await?;
        }
        Ok(Self::assemble(config.name, vfs))
    }

    /// Create an unnamed, empty kernel.
    pub fn empty() -> Self {
        Self::assemble(String::new(), Arc::new(VirtualFs::new()))
    }

    /// Wire the registries over one owned store.
    fn assemble(name: String, vfs: Arc<VirtualFs>) -> Self {
        let documents = Arc::new(DocumentRegistry::new(vfs.clone()));
        let editors = Arc::new(EditorRegistry::new(documents.clone()));
        Self {
            name,
            vfs,
            documents,
            editors,
        }
    }

    /// The kernel's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The virtual filesystem.
    pub fn vfs(&self) -> &Arc<VirtualFs> {
        &self.vfs
    }

    /// The document registry.
    pub fn documents(&self) -> &Arc<DocumentRegistry> {
        &self.documents
    }

    /// The editor registry.
    pub fn editors(&self) -> &Arc<EditorRegistry> {
        &self.editors
    }

    /// Reset the kernel to its initial state: no editors, no open
    /// documents, a bare root in the store.
    #[tracing::instrument(level = "debug", skip(self), fields(name = %self.name))]
    pub async fn reset(&self) {
        self.editors.clear();
        self.documents.clear();
        self.vfs.reset().await;
    }
}

impl std::fmt::Debug for HostKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostKernel")
            .field("name", &self.name)
            .field("documents", &self.documents.open_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsim_types::FileKind;

    fn uri(path: &str) -> Uri {
        Uri::file(path).unwrap()
    }

    #[tokio::test]
    async fn seed_files_are_readable() {
        let kernel = HostKernel::new(
            KernelConfig::named("seeded").with_seed_file("/p/a.txt", "hello".as_bytes().to_vec()),
        )
        .await
        .unwrap();

        assert_eq!(kernel.name(), "seeded");
        assert_eq!(
            kernel.vfs().read_file(&uri("/p/a.txt")).await.unwrap(),
            b"hello"
        );
        // Seeds are leaf entries; the parent was not synthesized.
        assert!(kernel.vfs().stat(&uri("/p")).await.is_err());
    }

    #[tokio::test]
    async fn kernels_are_isolated() {
        let left = HostKernel::empty();
        let right = HostKernel::empty();

        left.vfs()
            .write_file(&uri("/only-left.txt"), b"x".to_vec())
            .await
            .unwrap();

        assert!(left.vfs().exists(&uri("/only-left.txt")).await);
        assert!(!right.vfs().exists(&uri("/only-left.txt")).await);
    }

    #[tokio::test]
    async fn reset_restores_the_initial_state() {
        let kernel = HostKernel::empty();
        kernel
            .vfs()
            .write_file(&uri("/a.txt"), b"x".to_vec())
            .await
            .unwrap();
        kernel.editors().show(uri("/a.txt")).await.unwrap();

        kernel.reset().await;

        assert!(kernel.editors().active().is_none());
        assert_eq!(kernel.documents().open_count(), 0);
        assert!(!kernel.vfs().exists(&uri("/a.txt")).await);
        assert_eq!(
            kernel.vfs().stat(&uri("/")).await.unwrap().kind,
            FileKind::Directory
        );
    }
}
