//! Filesystem object store in git's loose-object layout.
//!
//! ```text
//! <root>/objects/
//!   info/
//!   pack/
//!   45/b983be36b73c0788dc9cbcb76cbb80fc7bb057    zlib(frame)
//! ```
//!
//! A record is written to a temporary file inside its shard directory and
//! then linked into place without clobbering. A reader therefore sees either
//! no file or a complete one, and concurrent writers of the same id agree on
//! a single winner.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gitcas_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compress::ZlibCompressor;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Directory under the repository root that holds object records.
pub const OBJECTS_DIR: &str = "objects";

/// Object store backed by sharded zlib files on disk.
#[derive(Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compressor: ZlibCompressor,
    fsync: bool,
}

impl LooseObjectStore {
    /// Open the store rooted at `root` (the directory containing `objects/`).
    pub fn open(root: impl AsRef<Path>, config: &StoreConfig) -> StoreResult<Self> {
        let objects_dir = root.as_ref().join(OBJECTS_DIR);
        if !objects_dir.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", objects_dir.display()),
            )));
        }
        Ok(Self {
            objects_dir,
            compressor: ZlibCompressor::new(config.compression_level),
            fsync: config.fsync,
        })
    }

    /// Create `objects/info` and `objects/pack` under `root` if missing, then
    /// open the store.
    pub fn init(root: impl AsRef<Path>, config: &StoreConfig) -> StoreResult<Self> {
        let objects_dir = root.as_ref().join(OBJECTS_DIR);
        fs::create_dir_all(objects_dir.join("info"))?;
        fs::create_dir_all(objects_dir.join("pack"))?;
        Self::open(root, config)
    }

    /// The `objects/` directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the record for `id`: `objects/<2 hex>/<38 hex>`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.objects_dir.join(id.shard()).join(id.loose_name())
    }

    /// All stored ids in ascending order.
    ///
    /// Anything that is not a two-character shard directory holding
    /// 38-character lowercase hex files is skipped.
    pub fn list_ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.objects_dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let prefix = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .filter(|n| is_lower_hex(n, 2));
            let rest = path
                .file_name()
                .and_then(|n| n.to_str())
                .filter(|n| is_lower_hex(n, 38));
            let (Some(prefix), Some(rest)) = (prefix, rest) else {
                continue;
            };
            if let Ok(id) = ObjectId::from_hex(&format!("{prefix}{rest}")) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn write_record(&self, id: &ObjectId, path: &Path, framed: &[u8]) -> StoreResult<()> {
        let shard = self.objects_dir.join(id.shard());
        fs::create_dir_all(&shard)?;

        let compressed = self.compressor.compress(framed)?;
        let mut tmp = NamedTempFile::new_in(&shard)?;
        tmp.write_all(&compressed)?;
        if self.fsync {
            tmp.as_file().sync_all()?;
        }
        let mut perms = tmp.as_file().metadata()?.permissions();
        perms.set_readonly(true);
        tmp.as_file().set_permissions(perms)?;

        match tmp.persist_noclobber(path) {
            Ok(_) => {
                debug!(
                    %id,
                    bytes = framed.len(),
                    compressed = compressed.len(),
                    "stored loose object"
                );
                Ok(())
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                warn!(%id, "object stored concurrently by another writer");
                Ok(())
            }
            Err(e) => Err(StoreError::Io(e.error)),
        }
    }
}

fn is_lower_hex(name: &str, len: usize) -> bool {
    name.len() == len && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl ObjectStore for LooseObjectStore {
    fn put(&self, id: &ObjectId, framed: &[u8]) -> StoreResult<()> {
        let path = self.object_path(id);
        if path.is_file() {
            debug!(%id, "object already present, skipping write");
            return Ok(());
        }
        self.write_record(id, &path, framed)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let compressed = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id));
            }
            Err(e) => return Err(e.into()),
        };
        self.compressor
            .decompress(&compressed)
            .map_err(|e| StoreError::CorruptData {
                id: *id,
                reason: e.to_string(),
            })
    }

    fn exists(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }
}
