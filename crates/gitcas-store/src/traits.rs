use gitcas_crypto::ObjectHasher;
use gitcas_types::ObjectId;
use tracing::debug;

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::object::Object;

/// Content-addressed, write-once object store.
///
/// Records are framed objects (`<kind> <len>\0<payload>`) keyed by their
/// digest. Implementations must satisfy:
/// - `put` of an id that is already present is a successful no-op, including
///   when two callers race on the same id.
/// - `get` returns exactly the bytes given to `put`.
/// - `get` of an id never written fails with [`StoreError::NotFound`].
/// - The store never interprets record contents; kind awareness lives in the
///   provided [`write_object`](ObjectStore::write_object) and
///   [`read_object`](ObjectStore::read_object).
pub trait ObjectStore: Send + Sync {
    /// Store framed bytes under `id` unless a record for `id` already exists.
    ///
    /// The caller is responsible for `id` being the digest of `framed`.
    fn put(&self, id: &ObjectId, framed: &[u8]) -> StoreResult<()>;

    /// Fetch the framed bytes stored under `id`.
    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether a record exists for `id`.
    fn exists(&self, id: &ObjectId) -> bool;

    /// Encode, digest, and store an object. Returns its id.
    fn write_object(&self, object: &Object) -> StoreResult<ObjectId> {
        let framed = codec::encode(object);
        let id = ObjectHasher::digest(&framed);
        self.put(&id, &framed)?;
        debug!(%id, kind = %object.kind(), bytes = framed.len(), "wrote object");
        Ok(id)
    }

    /// Fetch an object, verify its digest, and decode it.
    fn read_object(&self, id: &ObjectId) -> StoreResult<Object> {
        let framed = self.get(id)?;
        let computed = ObjectHasher::digest(&framed);
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        codec::decode(&framed)
    }

    /// Store several objects in order, stopping at the first failure.
    fn write_batch(&self, objects: &[Object]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write_object(obj)).collect()
    }
}
