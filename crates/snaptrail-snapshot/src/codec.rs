//! Content fingerprinting and compression.
//!
//! The persisted form of a snapshot stores only the compressed payload, so
//! every storage backend goes through [`ContentCodec`] rather than talking to
//! the compressor directly.

use crate::{SnapshotError, SnapshotResult};
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;

/// Codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// zlib compression level (0-9).
    pub compression_level: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

/// Hashes and (de)compresses text payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCodec {
    config: CodecConfig,
}

impl ContentCodec {
    /// Create a codec with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Hex-encoded SHA-256 of the UTF-8 bytes of `content`.
    pub fn hash(&self, content: &str) -> String {
        hash(content)
    }

    /// Compress `content` with zlib.
    pub fn compress(&self, content: &str) -> SnapshotResult<Vec<u8>> {
        let level = Compression::new(self.config.compression_level.min(9));
        let mut encoder = ZlibEncoder::new(Vec::new(), level);
        encoder
            .write_all(content.as_bytes())
            .map_err(|e| SnapshotError::codec(format!("compression failed: {e}")))?;
        encoder
            .finish()
            .map_err(|e| SnapshotError::codec(format!("compression failed: {e}")))
    }

    /// Decompress a payload produced by [`ContentCodec::compress`].
    ///
    /// Truncated or corrupt streams, bytes after the end of the stream and
    /// non-UTF-8 payloads are errors; partial output is never returned.
    pub fn decompress(&self, data: &[u8]) -> SnapshotResult<String> {
        let mut inflater = Decompress::new(true);
        let mut bytes: Vec<u8> = Vec::with_capacity(data.len().saturating_mul(4).max(256));

        // `decompress_vec` only fills spare capacity, so grow before every call.
        loop {
            if bytes.len() == bytes.capacity() {
                bytes.reserve(bytes.capacity());
            }

            let consumed = inflater.total_in();
            let produced = inflater.total_out();
            let input = usize::try_from(consumed)
                .ok()
                .and_then(|start| data.get(start..))
                .unwrap_or_default();
            let status = inflater
                .decompress_vec(input, &mut bytes, FlushDecompress::None)
                .map_err(|e| SnapshotError::codec(format!("invalid zlib stream: {e}")))?;

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let stalled =
                        inflater.total_in() == consumed && inflater.total_out() == produced;
                    if stalled && bytes.len() < bytes.capacity() {
                        return Err(SnapshotError::codec("zlib stream ended unexpectedly"));
                    }
                }
            }
        }

        let trailing = (data.len() as u64).saturating_sub(inflater.total_in());
        if trailing > 0 {
            return Err(SnapshotError::codec(format!(
                "{trailing} unexpected bytes after zlib stream"
            )));
        }

        String::from_utf8(bytes)
            .map_err(|e| SnapshotError::codec(format!("payload is not valid UTF-8: {e}")))
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
