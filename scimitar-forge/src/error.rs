//! Error types for forge container access.

use scimitar_resources::ResourceKind;
use thiserror::Error;

/// Errors from opening, enumerating, and extracting forge containers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a forge container (magic {0:02x?})")]
    InvalidMagic([u8; 8]),

    #[error("file too small to hold a forge header")]
    TruncatedHeader,

    #[error("unsupported forge version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid container layout: {0}")]
    InvalidLayout(String),

    #[error("read of {length} bytes at offset {offset} exceeds region of {region_size} bytes")]
    OutOfRange {
        offset: u64,
        length: u64,
        region_size: u64,
    },

    #[error("no entry named '{0}'")]
    EntryNotFound(String),

    #[error("duplicate file id {0:#018x} in index")]
    DuplicateEntry(u64),

    #[error("container declares {count} entries, over the confirmation limit of {limit}")]
    EntryCountExceedsLimit { count: u32, limit: u32 },

    #[error("entry holds no {0} resource")]
    ResourceMissing(ResourceKind),

    #[error(transparent)]
    Rdb(#[from] scimitar_rdb::Error),

    #[error(transparent)]
    Resource(#[from] scimitar_resources::Error),

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
