//! Where file contents for a commit come from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gitcas_store::EntryMode;

use crate::error::{SdkError, SdkResult};

/// One file to record: its tree entry name, mode, and contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mode: EntryMode,
    pub contents: Vec<u8>,
}

impl SourceFile {
    /// A regular (`100644`) file.
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mode: EntryMode::Regular,
            contents: contents.into(),
        }
    }

    /// An executable (`100755`) file.
    pub fn executable(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: EntryMode::Executable,
            ..Self::new(name, contents)
        }
    }
}

/// Supplies the files that make up one commit's root tree.
pub trait FileProvider {
    fn files(&self) -> SdkResult<Vec<SourceFile>>;
}

impl FileProvider for Vec<SourceFile> {
    fn files(&self) -> SdkResult<Vec<SourceFile>> {
        Ok(self.clone())
    }
}

/// Reads a fixed list of paths from disk. Each file is recorded under its
/// final path component.
#[derive(Clone, Debug, Default)]
pub struct FsFileProvider {
    paths: Vec<PathBuf>,
}

impl FsFileProvider {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn read(path: &Path) -> io::Result<SourceFile> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no UTF-8 file name"))?;
        let contents = fs::read(path)?;
        let mode = if is_executable(&fs::metadata(path)?) {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        };
        Ok(SourceFile {
            name: name.to_string(),
            mode,
            contents,
        })
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

impl FileProvider for FsFileProvider {
    fn files(&self) -> SdkResult<Vec<SourceFile>> {
        self.paths
            .iter()
            .map(|path| {
                Self::read(path).map_err(|source| SdkError::Source {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }
}
