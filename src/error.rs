//! Error types for BPK1 container and avatar record processing.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer does not carry the BPK1 magic, even after a
    /// decompression attempt. Carries the magic value originally observed.
    #[error("Bad BPK1 magic: got {found:#010x}")]
    BadMagic { found: u32 },

    /// The LZSS stream is malformed (bad variant tag, truncated control
    /// data, or a back-reference into data that was never emitted).
    #[error("LZSS decompression failed: {0}")]
    Codec(String),

    /// A directory entry describes a byte range outside the buffer.
    #[error("Block {name:?} out of range: offset {offset:#x} + size {size:#x} exceeds buffer of {buffer_len} bytes")]
    BlockRange {
        name: String,
        offset: u32,
        size: u32,
        buffer_len: usize,
    },

    /// An avatar record block was shorter than the fixed 92-byte layout.
    #[error("Avatar record too short: expected {expected} bytes, got {len}")]
    ShortRecord { len: usize, expected: usize },

    /// A name field contained bytes that do not decode as ASCII text.
    #[error("Name field is not valid ASCII text")]
    NameDecode,
}

/// A convenience `Result` type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ScrapeError>;
