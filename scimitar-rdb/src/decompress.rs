//! Per-game decompressors for forge entry payloads.
//!
//! Dispatch follows the compression-method byte located by [`crate::block`]:
//! `0x08` selects the legacy deflate family used by Odyssey and Origins,
//! `0x05` the LZ4 family used by Steep. Anything else is an
//! unrecognized-compression error, reported distinctly from a decode
//! failure.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, trace};

use crate::block::{locate_raw_data_markers_in, method_byte_offset, raw_block_payload};
use crate::{Error, Game, METHOD_DEFLATE, METHOD_LZ4, Result};

/// Capability interface for a game's payload decompression.
///
/// Implemented once per codec family and resolved through
/// [`decompressor_for`]; callers never branch on [`Game`] themselves.
pub trait Decompressor: Send + Sync {
    /// Decompress a complete raw entry payload held in memory.
    fn decompress(&self, raw: &[u8]) -> Result<Vec<u8>>;

    /// Streaming variant: decompress the file at `input` into `output`.
    ///
    /// Returns the number of decompressed bytes written.
    fn decompress_file(&self, input: &Path, output: &Path) -> Result<u64>;
}

/// Odyssey/Origins decompressor (deflate family, method byte `0x08`).
pub struct LegacyDecompressor;

/// Steep decompressor (LZ4 family, method byte `0x05`).
pub struct SteepDecompressor;

static LEGACY: LegacyDecompressor = LegacyDecompressor;
static STEEP: SteepDecompressor = SteepDecompressor;

/// Look up the decompressor implementation for a game.
pub fn decompressor_for(game: Game) -> &'static dyn Decompressor {
    match game {
        Game::Odyssey | Game::Origins => &LEGACY,
        Game::Steep => &STEEP,
    }
}

/// Decompress a standalone payload, selecting the codec family from the
/// method byte alone. Used for loose files where the owning game is not
/// known up front.
pub fn decompress_standalone(raw: &[u8]) -> Result<Vec<u8>> {
    let (method, payload) = raw_block_payload(raw)?;
    trace!("standalone payload method byte: {method:#04x}");
    match method {
        METHOD_DEFLATE => inflate_payload(payload),
        METHOD_LZ4 => lz4_payload(payload),
        other => Err(Error::UnsupportedCompression(other)),
    }
}

impl Decompressor for LegacyDecompressor {
    fn decompress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let (method, payload) = raw_block_payload(raw)?;
        if method != METHOD_DEFLATE {
            return Err(Error::UnsupportedCompression(method));
        }
        inflate_payload(payload)
    }

    fn decompress_file(&self, input: &Path, output: &Path) -> Result<u64> {
        let mut reader = BufReader::new(File::open(input)?);
        let at = locate_method_byte(&mut reader)?;
        reader.seek(SeekFrom::Start(at))?;

        let method = reader.read_u8()?;
        if method != METHOD_DEFLATE {
            return Err(Error::UnsupportedCompression(method));
        }
        let declared = u64::from(reader.read_u32::<LittleEndian>()?);

        // The deflate path decodes straight from the reader; the compressed
        // file is never fully resident.
        let mut decoder = ZlibDecoder::new(reader);
        let mut writer = BufWriter::new(File::create(output)?);
        let written = io::copy(&mut decoder, &mut writer)
            .map_err(|e| Error::DecompressionFailed(format!("deflate stream: {e}")))?;
        writer.flush()?;

        check_output_size(written, declared)?;
        debug!("deflate: {input:?} -> {output:?} ({written} bytes)");
        Ok(written)
    }
}

impl Decompressor for SteepDecompressor {
    fn decompress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let (method, payload) = raw_block_payload(raw)?;
        if method != METHOD_LZ4 {
            return Err(Error::UnsupportedCompression(method));
        }
        lz4_payload(payload)
    }

    fn decompress_file(&self, input: &Path, output: &Path) -> Result<u64> {
        let mut reader = BufReader::new(File::open(input)?);
        let at = locate_method_byte(&mut reader)?;
        reader.seek(SeekFrom::Start(at))?;

        let method = reader.read_u8()?;
        if method != METHOD_LZ4 {
            return Err(Error::UnsupportedCompression(method));
        }

        // An LZ4 block decodes from a complete buffer; only the payload is
        // loaded, not the surrounding container.
        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        let data = lz4_payload(&payload)?;

        let mut writer = BufWriter::new(File::create(output)?);
        writer.write_all(&data)?;
        writer.flush()?;

        debug!("lz4: {input:?} -> {output:?} ({} bytes)", data.len());
        Ok(data.len() as u64)
    }
}

/// Scan for the raw-data markers and rewind-independent method-byte offset.
fn locate_method_byte<R: Read + Seek>(reader: &mut R) -> Result<u64> {
    let markers = locate_raw_data_markers_in(&mut *reader)?;
    method_byte_offset(&markers)
}

/// Deflate-family payload: `u32` decompressed size, then a zlib stream.
fn inflate_payload(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < 4 {
        return Err(Error::Truncated {
            expected: 4,
            actual: payload.len() as u64,
        });
    }

    let mut cursor = Cursor::new(payload);
    let declared = u64::from(cursor.read_u32::<LittleEndian>()?);

    let mut decoder = ZlibDecoder::new(&payload[4..]);
    let mut result = Vec::new();
    decoder
        .read_to_end(&mut result)
        .map_err(|e| Error::DecompressionFailed(format!("deflate stream: {e}")))?;

    check_output_size(result.len() as u64, declared)?;
    debug!("deflate: {} bytes -> {} bytes", payload.len(), result.len());
    Ok(result)
}

/// LZ4-family payload: `u32` decompressed size, `u32` compressed size, then
/// a single LZ4 block.
fn lz4_payload(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < 8 {
        return Err(Error::Truncated {
            expected: 8,
            actual: payload.len() as u64,
        });
    }

    let mut cursor = Cursor::new(payload);
    let decompressed_size = cursor.read_u32::<LittleEndian>()? as usize;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as usize;

    if compressed_size + 8 != payload.len() {
        return Err(Error::DecompressionFailed(format!(
            "LZ4 size mismatch: expected {} bytes, got {}",
            compressed_size + 8,
            payload.len()
        )));
    }

    let result = lz4_flex::decompress(&payload[8..], decompressed_size)
        .map_err(|e| Error::DecompressionFailed(format!("LZ4 block: {e}")))?;

    check_output_size(result.len() as u64, decompressed_size as u64)?;
    debug!("lz4: {} bytes -> {} bytes", payload.len(), result.len());
    Ok(result)
}

/// A zero-length result is a decompression failure, never a valid empty
/// file; a size that disagrees with the declared one is treated the same.
fn check_output_size(actual: u64, declared: u64) -> Result<()> {
    if actual == 0 {
        return Err(Error::DecompressionFailed(
            "decompressed to zero bytes".into(),
        ));
    }
    if actual != declared {
        return Err(Error::DecompressionFailed(format!(
            "decompressed size mismatch: declared {declared}, got {actual}"
        )));
    }
    Ok(())
}
