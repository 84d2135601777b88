//! Locating the raw-data block header inside a compressed payload.
//!
//! A well-formed payload contains the raw-data marker at least twice. The
//! compression-method byte sits a fixed distance after the second
//! occurrence; everything beyond it belongs to the selected codec.

use std::io::Read;

use crate::scan::{MarkerTable, scan_buffer, scan_reader};
use crate::{BLOCK_HEADER_LEN, Error, RAW_DATA_MARKER, Result};

fn marker_table() -> MarkerTable {
    MarkerTable::single(RAW_DATA_MARKER)
}

/// Offsets of every raw-data marker in `data`, in file order.
pub fn locate_raw_data_markers(data: &[u8]) -> Vec<u64> {
    scan_buffer(data, &marker_table())
        .into_iter()
        .map(|hit| hit.offset)
        .collect()
}

/// Incremental variant of [`locate_raw_data_markers`] for sources that
/// should not be held fully resident.
pub fn locate_raw_data_markers_in<R: Read>(reader: R) -> std::io::Result<Vec<u64>> {
    Ok(scan_reader(reader, &marker_table())?
        .into_iter()
        .map(|hit| hit.offset)
        .collect())
}

/// Offset of the compression-method byte, derived from the marker list.
///
/// Fewer than two markers is a format error ("improper data").
pub fn method_byte_offset(markers: &[u64]) -> Result<u64> {
    if markers.len() < 2 {
        return Err(Error::ImproperData {
            found: markers.len(),
        });
    }
    Ok(markers[1] + RAW_DATA_MARKER.len() as u64 + BLOCK_HEADER_LEN)
}

/// Split a raw payload into its compression-method byte and codec payload.
pub fn raw_block_payload(raw: &[u8]) -> Result<(u8, &[u8])> {
    let markers = locate_raw_data_markers(raw);
    let at = method_byte_offset(&markers)?;
    let at = usize::try_from(at).map_err(|_| Error::Truncated {
        expected: u64::MAX,
        actual: raw.len() as u64,
    })?;
    if at >= raw.len() {
        return Err(Error::Truncated {
            expected: at as u64 + 1,
            actual: raw.len() as u64,
        });
    }
    Ok((raw[at], &raw[at + 1..]))
}
