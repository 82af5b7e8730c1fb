//! Content hashing for gitcas.
//!
//! Object ids are SHA-1 digests over the framed object bytes, identical to
//! the ids git computes for the same objects.
//!
//! All hashing wraps the `sha1` crate.

pub mod hasher;

pub use hasher::ObjectHasher;
