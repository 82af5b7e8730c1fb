use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use gitcas_types::ObjectId;

use crate::compress::ZlibCompressor;
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Records are kept zlib-compressed, the
/// same as on disk, so corruption and size behaviour match the loose store.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
    compressor: ZlibCompressor,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_compressor(ZlibCompressor::default())
    }

    /// Create an empty store compressing at the given level.
    pub fn with_compressor(compressor: ZlibCompressor) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            compressor,
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compressed bytes held across all records.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|record| record.len() as u64)
            .sum()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, id: &ObjectId, framed: &[u8]) -> StoreResult<()> {
        if self.exists(id) {
            return Ok(());
        }
        let record = self.compressor.compress(framed)?;
        let mut map = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        // First writer wins if another put landed between the check and here.
        map.entry(*id).or_insert(record);
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        let record = map.get(id).ok_or(StoreError::NotFound(*id))?;
        self.compressor
            .decompress(record)
            .map_err(|e| StoreError::CorruptData {
                id: *id,
                reason: e.to_string(),
            })
    }

    fn exists(&self, id: &ObjectId) -> bool {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
