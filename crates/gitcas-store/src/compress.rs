//! zlib compression for stored records.
//!
//! Loose objects are single zlib streams (header + deflate + adler32), the
//! format git reads from `objects/`. Decompression is strict: the input must
//! be exactly one complete stream, so truncated records and trailing garbage
//! are both reported instead of yielding partial data.

use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

/// Highest zlib level.
const MAX_LEVEL: u32 = 9;

/// A byte sequence that is not one valid zlib stream.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid zlib stream: {0}")]
pub struct DecompressError(String);

/// zlib compressor with a fixed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZlibCompressor {
    level: u32,
}

impl ZlibCompressor {
    /// Create a compressor. Levels above 9 are clamped.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    /// Level 1: speed over ratio.
    pub fn fast() -> Self {
        Self::new(1)
    }

    /// The effective compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Compress `data` into a single zlib stream.
    ///
    /// Only fails if writing to the in-memory buffer fails.
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(data.len() / 2 + 16),
            Compression::new(self.level),
        );
        encoder.write_all(data)?;
        encoder.finish()
    }

    /// Inflate exactly one zlib stream.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, DecompressError> {
        let mut inflater = Decompress::new(true);
        let mut out = Vec::with_capacity(data.len().saturating_mul(2).max(64));

        loop {
            if out.len() == out.capacity() {
                out.reserve(out.capacity());
            }
            let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
            let consumed = in_before as usize;
            let status = inflater
                .decompress_vec(&data[consumed..], &mut out, FlushDecompress::None)
                .map_err(|e| DecompressError(e.to_string()))?;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let stalled =
                        inflater.total_in() == in_before && inflater.total_out() == out_before;
                    if stalled {
                        return Err(DecompressError("truncated stream".into()));
                    }
                }
            }
        }

        let consumed = inflater.total_in() as usize;
        if consumed != data.len() {
            return Err(DecompressError(format!(
                "{} trailing bytes after stream end",
                data.len() - consumed
            )));
        }
        Ok(out)
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::fast()
    }
}
