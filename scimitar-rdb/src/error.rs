//! Error types for raw-data block location and decompression.

use thiserror::Error;

/// Result type for raw-data block operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Raw-data block error types.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than the two required raw-data markers were found.
    #[error("improper data: found {found} raw-data marker(s), need at least 2")]
    ImproperData { found: usize },

    /// Unrecognized compression-method byte.
    #[error("unsupported compression method: {0:#04x}")]
    UnsupportedCompression(u8),

    /// The selected codec could not decode the payload, or produced nothing.
    #[error("could not decompress: {0}")]
    DecompressionFailed(String),

    /// Truncated data
    #[error("truncated data: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },
}
