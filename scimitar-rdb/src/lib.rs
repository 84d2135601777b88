//! Raw-data block (RDB) handling for Anvil forge payloads.
//!
//! Every compressed payload stored inside a forge container carries at least
//! two copies of a fixed raw-data marker. The second occurrence is followed
//! by a short block header and a single compression-method byte which
//! selects the codec family for the rest of the payload. This crate locates
//! those markers and decodes the payload for each supported game.

pub mod block;
pub mod decompress;
pub mod error;
pub mod game;
pub mod scan;

pub use block::{locate_raw_data_markers, method_byte_offset, raw_block_payload};
pub use decompress::{Decompressor, decompress_standalone, decompressor_for};
pub use error::{Error, Result};
pub use game::Game;
pub use scan::{Marker, MarkerTable, ScanHit, scan_buffer, scan_reader};

/// Marker opening every raw-data block inside a forge payload.
pub const RAW_DATA_MARKER: [u8; 8] = [0x33, 0xAA, 0xFB, 0x57, 0x99, 0xFA, 0x04, 0x10];

/// Bytes between the end of the second marker and the compression-method byte.
pub const BLOCK_HEADER_LEN: u64 = 10;

/// Compression-method byte for the Odyssey/Origins deflate family.
pub const METHOD_DEFLATE: u8 = 0x08;

/// Compression-method byte for the Steep LZ4 family.
pub const METHOD_LZ4: u8 = 0x05;
