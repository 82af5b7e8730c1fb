use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length in bytes of an [`ObjectId`].
pub const OBJECT_ID_LEN: usize = 20;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 digest of an object's framed bytes
/// (`<kind> <len>\0<payload>`). Identical content always produces the same
/// `ObjectId`, which is what makes objects deduplicatable and lets the ids
/// agree with existing git tooling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Create an `ObjectId` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; OBJECT_ID_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw digest slice (e.g. embedded in a tree).
    pub fn from_raw(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; OBJECT_ID_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; OBJECT_ID_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; OBJECT_ID_LEN]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters, as git abbreviates).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Shard directory name: the first two hex characters.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// File name inside the shard directory: the remaining 38 hex characters.
    pub fn loose_name(&self) -> String {
        hex::encode(&self.0[1..])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_raw(&bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HI_BLOB: &str = "45b983be36b73c0788dc9cbcb76cbb80fc7bb057";

    #[test]
    fn null_is_all_zeros() {
        let null = ObjectId::null();
        assert!(null.is_null());
        assert_eq!(null.as_bytes(), &[0u8; OBJECT_ID_LEN]);
    }

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_hex(HI_BLOB).unwrap();
        assert_eq!(id.to_hex(), HI_BLOB);
        assert_eq!(id.as_bytes()[0], 0x45);
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let id = ObjectId::from_hex(&HI_BLOB.to_uppercase()).unwrap();
        assert_eq!(id.to_hex(), HI_BLOB);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = ObjectId::from_hex("45b983").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 20,
                actual: 3
            }
        );
        assert!(ObjectId::from_raw(&[0u8; 32]).is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let err = ObjectId::from_hex(&"zz".repeat(20)).unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn shard_and_loose_name_split_the_hex() {
        let id = ObjectId::from_hex(HI_BLOB).unwrap();
        assert_eq!(id.shard(), "45");
        assert_eq!(id.loose_name(), "b983be36b73c0788dc9cbcb76cbb80fc7bb057");
        assert_eq!(format!("{}{}", id.shard(), id.loose_name()), HI_BLOB);
    }

    #[test]
    fn short_hex_is_7_chars() {
        let id = ObjectId::from_hex(HI_BLOB).unwrap();
        assert_eq!(id.short_hex(), "45b983b");
    }

    #[test]
    fn display_and_from_str_agree() {
        let id: ObjectId = HI_BLOB.parse().unwrap();
        assert_eq!(format!("{id}"), HI_BLOB);
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::from_hex(HI_BLOB).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let id1 = ObjectId::from_hash([0; OBJECT_ID_LEN]);
        let id2 = ObjectId::from_hash([1; OBJECT_ID_LEN]);
        assert!(id1 < id2);
    }
}
