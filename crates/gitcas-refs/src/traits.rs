//! The [`RefStore`] trait defining the reference storage interface.

use gitcas_types::ObjectId;

use crate::error::Result;
use crate::types::Head;

/// Storage backend for `HEAD` and branch references.
///
/// Implementations must be thread-safe (`Send + Sync`). Each branch holds a
/// single commit id; updating a branch replaces it atomically.
pub trait RefStore: Send + Sync {
    /// Read the current HEAD state.
    ///
    /// Returns `Ok(None)` if HEAD has not been set.
    fn head(&self) -> Result<Option<Head>>;

    /// Set HEAD to point at a branch (symbolic ref).
    ///
    /// The branch does not need to exist yet.
    fn set_head(&self, branch: &str) -> Result<()>;

    /// Read the commit a branch points to.
    ///
    /// Returns `Ok(None)` if the branch has no commits yet.
    fn read_branch(&self, branch: &str) -> Result<Option<ObjectId>>;

    /// Create or move a branch to `id`.
    fn update_branch(&self, branch: &str, id: &ObjectId) -> Result<()>;

    /// All branches and their commits, sorted by name.
    fn list_branches(&self) -> Result<Vec<(String, ObjectId)>>;

    /// The branch HEAD names, or `None` when HEAD is unset or detached.
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.head()?.and_then(|head| head.branch().map(str::to_string)))
    }

    /// Resolve HEAD to a commit id, following one level of symbolic ref.
    fn resolve_head(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Some(Head::Symbolic(branch)) => self.read_branch(&branch),
            Some(Head::Detached(id)) => Ok(Some(id)),
            None => Ok(None),
        }
    }
}
