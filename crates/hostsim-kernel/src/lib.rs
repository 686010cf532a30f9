//! hostsim-kernel: the core of the editor-host simulation.
//!
//! This crate provides:
//!
//! - **VFS**: an in-memory virtual filesystem with the host's exact path
//!   and error semantics, including its shallow copy/rename behavior
//! - **Events**: synchronous emitters, idempotent disposables, and
//!   cooperative cancellation
//! - **Documents**: line-addressable text documents over VFS content
//! - **Editors**: the active/visible editor registry
//! - **Kernel**: composition of the above into one owned instance
//!
//! Every public filesystem and registry operation is `async` to match the
//! host's calling convention, but executes synchronously against in-memory
//! state — operations against one kernel resolve in call order.

pub mod documents;
pub mod editors;
pub mod events;
pub mod kernel;
pub mod vfs;

pub use documents::{DocumentRegistry, TextDocument};
pub use editors::{EditorRegistry, ShowTarget, TextEditor};
pub use events::{CancellationSource, CancellationToken, Disposable, EventEmitter};
pub use kernel::{HostKernel, KernelConfig};
pub use vfs::VirtualFs;

// Re-export the pure data types so embedders need a single import path.
pub use hostsim_types::{
    DirEntry, EventError, FileKind, FileStat, FsError, FsResult, Position, Range, Selection, Uri,
};
