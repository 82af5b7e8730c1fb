//! High-level API for gitcas.
//!
//! [`Repository`] ties an object store and the ref files together and builds
//! the object graph in three stages: file contents become blobs, blobs are
//! listed in a tree, and a commit records the tree with author, committer,
//! and message. This is the main entry point for applications embedding
//! gitcas.

pub mod config;
pub mod error;
pub mod identity;
pub mod repository;
pub mod source;

pub use config::{IdentityConfig, RepoConfig};
pub use error::{SdkError, SdkResult};
pub use identity::{Clock, ConfiguredIdentity, FixedClock, IdentityProvider, SystemClock};
pub use repository::{CommitOutcome, Repository};
pub use source::{FileProvider, FsFileProvider, SourceFile};

// Re-export key types
pub use gitcas_store::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};
pub use gitcas_types::{GitTime, ObjectId, Signature, TzOffset};
