//! Foundation types for gitcas.
//!
//! This crate provides the identifier, identity, and time types shared by
//! every other gitcas crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] — 20-byte content digest (SHA-1 of the framed object)
//! - [`Signature`] — author/committer identity line
//! - [`GitTime`] — unix seconds plus a [`TzOffset`]

pub mod error;
pub mod identity;
pub mod object;
pub mod temporal;

pub use error::TypeError;
pub use identity::Signature;
pub use object::{ObjectId, OBJECT_ID_LEN};
pub use temporal::{GitTime, TzOffset};
