use gitcas_types::ObjectId;
use sha1::{Digest, Sha1};

/// Incremental SHA-1 hasher producing [`ObjectId`]s.
///
/// The one-shot [`ObjectHasher::digest`] covers the common case. Feed bytes
/// with [`ObjectHasher::update`] when the framed object is produced in pieces;
/// the result is identical to hashing the concatenation.
#[derive(Clone, Default)]
pub struct ObjectHasher {
    inner: Sha1,
}

impl ObjectHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the running digest.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Consume the hasher and return the digest.
    pub fn finalize(self) -> ObjectId {
        ObjectId::from_hash(self.inner.finalize().into())
    }

    /// Digest an exact byte sequence. Total over all inputs, including empty.
    pub fn digest(data: &[u8]) -> ObjectId {
        ObjectId::from_hash(Sha1::digest(data).into())
    }

    /// Digest the frame `<keyword> <len>\0<payload>` without building it.
    pub fn hash_object(keyword: &str, payload: &[u8]) -> ObjectId {
        let mut hasher = Self::new();
        hasher
            .update(keyword.as_bytes())
            .update(b" ")
            .update(payload.len().to_string().as_bytes())
            .update(b"\0")
            .update(payload);
        hasher.finalize()
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(data: &[u8], expected: &ObjectId) -> bool {
        Self::digest(data) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_blob_digest() {
        let id = ObjectHasher::digest(b"blob 3\0hi\n");
        assert_eq!(id.to_hex(), "45b983be36b73c0788dc9cbcb76cbb80fc7bb057");
    }

    #[test]
    fn empty_input_is_defined() {
        assert_eq!(
            ObjectHasher::digest(b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn hash_object_matches_framed_digest() {
        assert_eq!(
            ObjectHasher::hash_object("blob", b"hi\n"),
            ObjectHasher::digest(b"blob 3\0hi\n")
        );
        assert_eq!(
            ObjectHasher::hash_object("tree", b"").to_hex(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn verify_correct_data() {
        let id = ObjectHasher::digest(b"test data");
        assert!(ObjectHasher::verify(b"test data", &id));
        assert!(!ObjectHasher::verify(b"tampered", &id));
    }

    proptest! {
        #[test]
        fn digest_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(ObjectHasher::digest(&data), ObjectHasher::digest(&data));
        }

        #[test]
        fn incremental_equals_one_shot(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            split in 0usize..512,
        ) {
            let split = split.min(data.len());
            let mut hasher = ObjectHasher::new();
            hasher.update(&data[..split]).update(&data[split..]);
            prop_assert_eq!(hasher.finalize(), ObjectHasher::digest(&data));
        }
    }
}
