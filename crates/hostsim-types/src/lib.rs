//! Pure data types for hostsim — geometry, URIs, file metadata, and errors.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It
//! exists so that consumers (command layers, test harnesses) can work with
//! the simulated host's value types without pulling in the kernel.

pub mod error;
pub mod file;
pub mod position;
pub mod range;
pub mod selection;
pub mod uri;

// Flat re-exports for convenience
pub use error::*;
pub use file::*;
pub use position::*;
pub use range::*;
pub use selection::*;
pub use uri::*;
