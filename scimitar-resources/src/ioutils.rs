//! Internal bounds-checked table reader.

use crate::error::{Error, Result};

/// Cursor over a resource sub-table that reports truncation as a typed
/// error instead of an IO error.
pub(crate) struct TableReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TableReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left in the table, for bounding declared element counts.
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::Truncated {
            needed: u64::MAX,
            available: self.data.len() as u64,
        })?;
        if end > self.data.len() {
            return Err(Error::Truncated {
                needed: end as u64,
                available: self.data.len() as u64,
            });
        }
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u16le(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32le(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn read_u64le(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut v = [0u8; 8];
        v.copy_from_slice(b);
        Ok(u64::from_le_bytes(v))
    }

    pub(crate) fn read_f32le(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_order() {
        let mut buf = Vec::new();
        buf.push(7u8);
        buf.extend_from_slice(&0x1234u16.to_le_bytes());
        buf.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        let mut r = TableReader::new(&buf);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16le().unwrap(), 0x1234);
        assert_eq!(r.read_u32le().unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn truncation_is_typed() {
        let mut r = TableReader::new(&[1, 2]);
        match r.read_u32le() {
            Err(Error::Truncated {
                needed: 4,
                available: 2,
            }) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }
    }
}
