//! Reference management for gitcas repositories.
//!
//! References are the mutable entry points into an otherwise immutable
//! object graph:
//!
//! - **Branches** (`refs/heads/<name>`) each hold one commit id and move
//!   forward as commits are made.
//! - **HEAD** names the current branch (`ref: refs/heads/<name>`), or holds a
//!   commit id directly when detached.
//!
//! # Modules
//!
//! - [`error`] — Error types for ref operations
//! - [`types`] — [`Head`] and ref naming helpers
//! - [`traits`] — The [`RefStore`] trait defining the storage interface
//! - [`names`] — Branch name validation
//! - [`file`] — [`FileRefStore`], the on-disk layout

pub mod error;
pub mod file;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use names::validate_branch_name;
pub use traits::RefStore;
pub use types::{branch_ref, Head};
