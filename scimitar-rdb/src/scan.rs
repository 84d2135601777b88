//! Signature scanning over in-memory buffers and incremental readers.
//!
//! A single left-to-right pass reports non-overlapping marker hits in file
//! order. The reader variant consumes the source in fixed-size chunks and
//! never requires the whole input to be resident, which is what the archive
//! and standalone-file paths use for large inputs.

use std::io::Read;
use tracing::trace;

/// A fixed byte signature with a caller-chosen identifier.
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: u32,
    pub bytes: Vec<u8>,
}

/// Ordered set of markers to scan for.
///
/// When several markers could match at the same offset, the one added first
/// wins; matching then resumes past it (non-overlapping).
#[derive(Debug, Clone, Default)]
pub struct MarkerTable {
    markers: Vec<Marker>,
    max_len: usize,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding a single marker with id 0.
    pub fn single(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new().with_marker(0, bytes)
    }

    #[must_use]
    pub fn with_marker(mut self, id: u32, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        debug_assert!(!bytes.is_empty());
        self.max_len = self.max_len.max(bytes.len());
        self.markers.push(Marker { id, bytes });
        self
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Length of the longest marker in the table.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn match_at(&self, window: &[u8]) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| window.len() >= m.bytes.len() && window[..m.bytes.len()] == m.bytes[..])
    }
}

/// A signature hit reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit {
    /// Absolute offset of the first marker byte.
    pub offset: u64,
    /// Identifier of the matched marker.
    pub marker: u32,
}

/// Scan an in-memory buffer for every marker in the table.
pub fn scan_buffer(data: &[u8], table: &MarkerTable) -> Vec<ScanHit> {
    let mut hits = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        if let Some(m) = table.match_at(&data[pos..]) {
            hits.push(ScanHit {
                offset: pos as u64,
                marker: m.id,
            });
            pos += m.bytes.len();
        } else {
            pos += 1;
        }
    }
    trace!("scan_buffer: {} hit(s) in {} bytes", hits.len(), data.len());
    hits
}

/// Incrementally scan a reader for every marker in the table.
///
/// Reads the source in 64 KiB chunks, carrying `max_len - 1` bytes across
/// chunk seams so markers straddling a boundary are still found. Hit offsets
/// are absolute within the stream.
pub fn scan_reader<R: Read>(mut reader: R, table: &MarkerTable) -> std::io::Result<Vec<ScanHit>> {
    const CHUNK: usize = 64 * 1024;

    let carry = table.max_len().saturating_sub(1);
    let mut hits = Vec::new();
    let mut buf: Vec<u8> = Vec::with_capacity(CHUNK + carry);
    let mut chunk = vec![0u8; CHUNK];
    let mut base = 0u64;

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        // Only scan up to where a marker could still straddle the seam.
        let limit = buf.len().saturating_sub(carry);
        let mut pos = 0usize;
        while pos < limit {
            if let Some(m) = table.match_at(&buf[pos..]) {
                hits.push(ScanHit {
                    offset: base + pos as u64,
                    marker: m.id,
                });
                pos += m.bytes.len();
            } else {
                pos += 1;
            }
        }

        base += pos as u64;
        buf.drain(..pos);
    }

    // Flush the undecided tail.
    let mut pos = 0usize;
    while pos < buf.len() {
        if let Some(m) = table.match_at(&buf[pos..]) {
            hits.push(ScanHit {
                offset: base + pos as u64,
                marker: m.id,
            });
            pos += m.bytes.len();
        } else {
            pos += 1;
        }
    }

    trace!("scan_reader: {} hit(s)", hits.len());
    Ok(hits)
}
