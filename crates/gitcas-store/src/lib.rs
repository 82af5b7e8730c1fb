//! Content-addressed object storage for gitcas.
//!
//! Objects are framed as `<kind> <len>\0<payload>`, identified by the SHA-1
//! of that frame, zlib-compressed, and written once under
//! `objects/<2 hex>/<38 hex>`: byte-for-byte the loose-object format git
//! reads.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- snapshot record pointing at a root tree
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- sharded zlib files on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; a second `put` of the same id is a no-op.
//! 2. Records appear atomically: readers see no file or a complete one.
//! 3. The store never interprets record contents; the [`codec`] does.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod compress;
pub mod config;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use compress::{DecompressError, ZlibCompressor};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};
pub use traits::ObjectStore;
