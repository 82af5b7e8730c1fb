//! File-backed [`RefStore`] in git's on-disk layout.
//!
//! ```text
//! <root>/HEAD                 "ref: refs/heads/master" (no newline)
//! <root>/refs/heads/<branch>  "<40 hex>\n"
//! <root>/refs/tags/
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gitcas_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;
use crate::traits::RefStore;
use crate::types::{branch_ref, Head, HEADS_PREFIX};

/// Name of the HEAD file under the repository root.
pub const HEAD_FILE: &str = "HEAD";

/// References stored as plain files under a repository root.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    root: PathBuf,
}

impl FileRefStore {
    /// Open a ref store rooted at `root`. Nothing is read or created.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `refs/heads` and `refs/tags` under `root` if missing.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::open(root);
        fs::create_dir_all(store.heads_dir())?;
        fs::create_dir_all(store.root.join("refs/tags"))?;
        Ok(store)
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the HEAD file.
    pub fn head_path(&self) -> PathBuf {
        self.root.join(HEAD_FILE)
    }

    /// Path of a branch file. The name is not validated.
    pub fn branch_path(&self, branch: &str) -> PathBuf {
        self.root.join(branch_ref(branch))
    }

    fn heads_dir(&self) -> PathBuf {
        self.root.join(HEADS_PREFIX)
    }
}

/// Replace `path` with `contents` via a temp file in the same directory.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        RefError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", path.display()),
        ))
    })?;
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| RefError::Io(e.error))?;
    Ok(())
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl RefStore for FileRefStore {
    fn head(&self) -> Result<Option<Head>> {
        read_optional(&self.head_path())?
            .map(|contents| Head::parse(&contents))
            .transpose()
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        let head = Head::Symbolic(branch.to_string());
        write_atomic(&self.head_path(), head.to_string().as_bytes())?;
        debug!(%branch, "HEAD updated");
        Ok(())
    }

    fn read_branch(&self, branch: &str) -> Result<Option<ObjectId>> {
        validate_branch_name(branch)?;
        let Some(contents) = read_optional(&self.branch_path(branch))? else {
            return Ok(None);
        };
        ObjectId::from_hex(contents.trim_end())
            .map(Some)
            .map_err(|e| RefError::MalformedRef {
                name: branch_ref(branch),
                reason: e.to_string(),
            })
    }

    fn update_branch(&self, branch: &str, id: &ObjectId) -> Result<()> {
        validate_branch_name(branch)?;
        write_atomic(&self.branch_path(branch), format!("{id}\n").as_bytes())?;
        debug!(%branch, %id, "branch updated");
        Ok(())
    }

    fn list_branches(&self) -> Result<Vec<(String, ObjectId)>> {
        let heads_dir = self.heads_dir();
        if !heads_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut branches = Vec::new();
        for entry in WalkDir::new(&heads_dir).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&heads_dir) else {
                continue;
            };
            let components: Option<Vec<&str>> = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect();
            let Some(branch) = components.map(|c| c.join("/")) else {
                continue;
            };
            // Temp files and anything else git would not treat as a branch.
            if validate_branch_name(&branch).is_err() {
                continue;
            }
            if let Some(id) = self.read_branch(&branch)? {
                branches.push((branch, id));
            }
        }
        branches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(branches)
    }
}
