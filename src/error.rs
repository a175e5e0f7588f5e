//! Error types surfaced by the archive core.

use thiserror::Error;

/// Result type used throughout the archive core.
pub type Result<T> = std::result::Result<T, ZipError>;

/// Everything that can go wrong while locating, listing or extracting.
///
/// Failures raised by a [`RangeFetcher`](crate::io::RangeFetcher) are carried
/// unchanged in [`ZipError::Transport`].
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("remote server does not support Range requests: {url}")]
    RangeUnsupported { url: String },

    #[error("end of central directory record not found")]
    DirectoryNotFound,

    #[error("central directory of {size} bytes does not fit in the {limit} byte tail window")]
    DirectoryTooLarge { size: u64, limit: u64 },

    #[error("central directory truncated at offset {offset} after {entries} entries")]
    TruncatedDirectory { offset: u64, entries: usize },

    #[error("invalid central directory record at offset {offset}")]
    CorruptDirectory { offset: u64 },

    #[error("{what} out of bounds: offset {offset} + length {length} exceeds {limit}")]
    InvalidOffset {
        what: &'static str,
        offset: u64,
        length: u64,
        limit: u64,
    },

    #[error("invalid local file header at offset {offset}")]
    InvalidLocalHeader { offset: u64 },

    #[error("member not found in archive: {name}")]
    MemberNotFound { name: String },

    #[error(
        "directory and local header disagree on compressed size of {name}: {directory} != {local}"
    )]
    SizeMismatch {
        name: String,
        directory: u32,
        local: u32,
    },

    #[error("unsupported compression method: {0} (only STORED and DEFLATE are supported)")]
    UnsupportedCompressionMethod(u16),

    #[error("failed to inflate member data: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("CRC-32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ZipError {
    pub(crate) fn out_of_bounds(what: &'static str, offset: u64, length: u64, limit: u64) -> Self {
        ZipError::InvalidOffset {
            what,
            offset,
            length,
            limit,
        }
    }
}
