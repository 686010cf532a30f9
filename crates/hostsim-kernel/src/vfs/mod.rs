//! Virtual filesystem for the simulated host.
//!
//! One in-memory store per kernel instance, keyed by normalized absolute
//! path. All data is ephemeral.
//!
//! # Design
//!
//! The store is a flat path → node map, not a tree. That flatness is
//! observable and part of the host contract: deep writes establish only the
//! leaf entry, and `copy`/`rename` on a directory move only the named entry
//! while children keep their old paths.

mod store;

pub use store::VirtualFs;
