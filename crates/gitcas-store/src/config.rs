use serde::{Deserialize, Serialize};

/// Tuning knobs for object storage. None of them affect object ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// zlib level, 0..=9. Defaults to 1 (fast), matching loose-object writers
    /// that favour speed over ratio.
    pub compression_level: u32,
    /// `fsync` each object file before it is moved into place.
    pub fsync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression_level: 1,
            fsync: false,
        }
    }
}
