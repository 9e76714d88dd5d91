//! Portable encoding of index snapshots.
//!
//! A snapshot is written as a versioned record (metadata, version, documents)
//! encoded with bincode and optionally compressed with zstd. Token statistics
//! are not stored; they are rebuilt when the record is decoded.

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use zstd::{decode_all, encode_all};

use crate::document::Document;
use crate::schema::IndexMeta;
use crate::snapshot::IndexSnapshot;
use crate::IndexError;

/// Bump this value whenever the encoded snapshot layout changes.
pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

/// Compression codec options for encoded snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// No compression (useful for debugging).
    None,
    /// Zstd compression (default, good balance of speed and ratio).
    #[default]
    Zstd,
}

/// Compression behavior configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// Compression level (1-22 for Zstd, where higher = better compression but slower).
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(decode_all(data)?),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    schema_version: u16,
    meta: IndexMeta,
    version: u64,
    documents: Vec<Document>,
}

/// Encode a snapshot into a self-contained byte buffer.
pub fn encode_snapshot(
    snapshot: &IndexSnapshot,
    compression: &CompressionConfig,
) -> Result<Vec<u8>, IndexError> {
    let record = SnapshotRecord {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        meta: snapshot.meta().clone(),
        version: snapshot.version(),
        documents: snapshot.documents().cloned().collect(),
    };
    let encoded = encode_to_vec(&record, standard())?;
    compression.compress(&encoded)
}

/// Decode a buffer produced by [`encode_snapshot`] with the same compression settings.
pub fn decode_snapshot(
    data: &[u8],
    compression: &CompressionConfig,
) -> Result<IndexSnapshot, IndexError> {
    let decompressed = compression.decompress(data)?;
    let (record, _): (SnapshotRecord, usize) = decode_from_slice(&decompressed, standard())?;
    if record.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(IndexError::Decode(format!(
            "unsupported snapshot schema version {} (expected {})",
            record.schema_version, SNAPSHOT_SCHEMA_VERSION
        )));
    }
    IndexSnapshot::from_parts(record.meta, record.version, record.documents)
}
