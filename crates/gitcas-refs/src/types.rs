//! Core reference types.
//!
//! Only two kinds of reference exist: `HEAD`, and branches under
//! `refs/heads/` that each hold a single commit id.

use std::fmt;

use gitcas_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;

/// Namespace prefix for branch refs.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Prefix of a symbolic ref file.
const SYMREF_PREFIX: &str = "ref: ";

/// Canonical ref name for a branch, e.g. `refs/heads/master`.
pub fn branch_ref(branch: &str) -> String {
    format!("{HEADS_PREFIX}{branch}")
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// HEAD points to a branch by name.
    Symbolic(String),
    /// HEAD is detached, pointing directly to a commit.
    Detached(ObjectId),
}

impl Head {
    /// Parse the contents of a `HEAD` file. Trailing whitespace is ignored.
    pub fn parse(contents: &str) -> Result<Self> {
        let line = contents.trim_end();
        let malformed = || RefError::MalformedHead(contents.to_string());

        if let Some(target) = line.strip_prefix(SYMREF_PREFIX) {
            let branch = target.strip_prefix(HEADS_PREFIX).ok_or_else(malformed)?;
            validate_branch_name(branch).map_err(|_| malformed())?;
            return Ok(Self::Symbolic(branch.to_string()));
        }
        ObjectId::from_hex(line)
            .map(Self::Detached)
            .map_err(|_| malformed())
    }

    /// The branch HEAD names, if it is symbolic.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Symbolic(branch) => Some(branch),
            Self::Detached(_) => None,
        }
    }
}

/// Renders the exact `HEAD` file contents (no trailing newline).
impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbolic(branch) => write!(f, "{SYMREF_PREFIX}{HEADS_PREFIX}{branch}"),
            Self::Detached(id) => write!(f, "{id}"),
        }
    }
}
