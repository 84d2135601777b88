//! Error types for resource location and extraction.

use thiserror::Error;

use crate::ResourceKind;

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Declared sub-table extends past the end of the buffer.
    #[error("truncated resource data: need {needed} bytes, have {available}")]
    Truncated { needed: u64, available: u64 },

    /// The location points at a different resource kind than requested.
    #[error("wrong resource kind: expected {expected}, found {found}")]
    WrongResourceKind {
        expected: ResourceKind,
        found: ResourceKind,
    },

    /// Unknown mesh sub-format version.
    #[error("unsupported mesh version {found}, expected {expected}")]
    UnsupportedMeshVersion { found: u16, expected: u16 },

    /// Unknown texture header version.
    #[error("unsupported surface version: {0}")]
    UnsupportedSurfaceVersion(u16),

    /// Surface format code outside the documented set.
    #[error("unknown surface format: {0:#010x}")]
    UnknownSurfaceFormat(u32),

    /// Structurally invalid resource data.
    #[error("malformed resource: {0}")]
    MalformedResource(String),

    /// The display-format conversion step failed or is unavailable.
    #[error("surface conversion unavailable: {0}")]
    ConversionUnavailable(String),

    /// Raw-data block error from the underlying payload.
    #[error("raw data error: {0}")]
    Rdb(#[from] scimitar_rdb::Error),
}
