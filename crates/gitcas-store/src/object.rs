use std::cmp::Ordering;
use std::collections::HashSet;

use gitcas_crypto::ObjectHasher;
use gitcas_types::{ObjectId, Signature};

use crate::codec;
use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot record: tree, optional parent, identities, message.
    Commit,
}

impl ObjectKind {
    /// The ASCII keyword that starts every frame of this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a frame keyword.
    pub fn from_keyword(keyword: &[u8]) -> Option<Self> {
        match keyword {
            b"blob" => Some(Self::Blob),
            b"tree" => Some(Self::Tree),
            b"commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Normal file (100644).
    Regular,
    /// Executable file (100755).
    Executable,
    /// Symbolic link (120000).
    Symlink,
    /// Subtree / directory (40000).
    Directory,
    /// Submodule commit reference (160000).
    Submodule,
}

impl EntryMode {
    /// The exact ASCII form written into tree payloads.
    ///
    /// Directories are `40000` with no leading zero; padding it changes the
    /// tree's id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Directory => "40000",
            Self::Submodule => "160000",
        }
    }

    /// Parse the ASCII form used in tree payloads.
    pub fn from_ascii(mode: &[u8]) -> Option<Self> {
        match mode {
            b"100644" => Some(Self::Regular),
            b"100755" => Some(Self::Executable),
            b"120000" => Some(Self::Symlink),
            b"40000" => Some(Self::Directory),
            b"160000" => Some(Self::Submodule),
            _ => None,
        }
    }

    /// Returns `true` if the entry names a subtree.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory, submodule).
    pub mode: EntryMode,
    /// Entry name: one path segment.
    pub name: String,
    /// Id of the referenced blob, tree, or commit.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            id,
        }
    }

    fn validate(&self) -> StoreResult<()> {
        let reason = if self.name.is_empty() {
            "name must not be empty"
        } else if self.name.contains('/') {
            "name must be a single path segment"
        } else if self.name.contains('\0') {
            "name must not contain NUL"
        } else if self.name == "." || self.name == ".." {
            "name must not be a relative path component"
        } else {
            return Ok(());
        };
        Err(StoreError::InvalidTreeEntry {
            name: self.name.clone(),
            reason: reason.into(),
        })
    }
}

/// Canonical tree order: byte-wise by name, where a directory compares as if
/// its name ended in `/`.
pub fn tree_order(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let (an, bn) = (a.name.as_bytes(), b.name.as_bytes());
    let common = an.len().min(bn.len());
    an[..common].cmp(&bn[..common]).then_with(|| {
        let next = |name: &[u8], entry: &TreeEntry| {
            name.get(common)
                .copied()
                .or_else(|| entry.mode.is_tree().then_some(b'/'))
        };
        next(an, a).cmp(&next(bn, b))
    })
}

/// Directory listing object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree from entries in any order.
    ///
    /// Entries are sorted into canonical order. Fails on empty, nested, or
    /// duplicate names.
    pub fn new(mut entries: Vec<TreeEntry>) -> StoreResult<Self> {
        entries.sort_by(tree_order);
        Self::check(&entries)?;
        Ok(Self { entries })
    }

    /// Create a tree from entries that must already be in canonical order.
    ///
    /// Used when decoding, where reordering would change the bytes that the
    /// id was computed over.
    pub fn from_sorted(entries: Vec<TreeEntry>) -> StoreResult<Self> {
        Self::check(&entries)?;
        if let Some(pair) = entries
            .windows(2)
            .find(|w| tree_order(&w[0], &w[1]) != Ordering::Less)
        {
            return Err(StoreError::MalformedObject(format!(
                "tree entries out of order: {:?} before {:?}",
                pair[0].name, pair[1].name
            )));
        }
        Ok(Self { entries })
    }

    fn check(entries: &[TreeEntry]) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in entries {
            entry.validate()?;
            if !seen.insert(entry.name.as_str()) {
                return Err(StoreError::InvalidTreeEntry {
                    name: entry.name.clone(),
                    reason: "duplicate name".into(),
                });
            }
        }
        Ok(())
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Snapshot record pointing at a root tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: ObjectId,
    /// Previous commit, if any. Single-parent only.
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Free-text message, stored without the terminating newline.
    pub message: String,
}

impl Commit {
    /// Create a root commit (no parent).
    pub fn new(
        tree: ObjectId,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent: None,
            author,
            committer,
            message: message.into(),
        }
    }

    /// Set the parent commit.
    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any of the three storable object kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// The kind tag written in the frame header.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Compute the content-addressed id: the digest of the full frame.
    pub fn id(&self) -> ObjectId {
        ObjectHasher::hash_object(self.kind().keyword(), &codec::encode_payload(self))
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}
