//! On-disk layout of the forge container.
//!
//! Layout, all little-endian:
//!
//! ```text
//! header      64 bytes at offset 0
//! index       entry_count records of 20 bytes each at index_offset
//! name table  entry_count variable-length records at name_table_offset
//! data        data_size bytes at data_offset; entry offsets are relative
//!             to this region
//! ```

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// First eight bytes of every container.
pub const FORGE_MAGIC: [u8; 8] = *b"scimitar";

/// The only layout version this crate reads.
pub const FORGE_VERSION: u32 = 1;

/// Fixed header size, including reserved tail bytes.
pub const HEADER_LEN: u64 = 64;

/// Size of one index record: file id, data offset, size.
pub const INDEX_RECORD_LEN: u64 = 20;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgeHeader {
    pub version: u32,
    pub entry_count: u32,
    pub index_offset: u64,
    pub name_table_offset: u64,
    pub data_offset: u64,
    pub data_size: u64,
}

impl ForgeHeader {
    /// Parse a header from the start of a container.
    ///
    /// Validates the magic and version and that the declared table offsets
    /// land inside `file_size`.
    pub fn parse<R: Read>(reader: &mut R, file_size: u64) -> Result<Self> {
        if file_size < HEADER_LEN {
            return Err(Error::TruncatedHeader);
        }

        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != FORGE_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != FORGE_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let entry_count = reader.read_u32::<LittleEndian>()?;
        let index_offset = reader.read_u64::<LittleEndian>()?;
        let name_table_offset = reader.read_u64::<LittleEndian>()?;
        let data_offset = reader.read_u64::<LittleEndian>()?;
        let data_size = reader.read_u64::<LittleEndian>()?;

        let header = Self {
            version,
            entry_count,
            index_offset,
            name_table_offset,
            data_offset,
            data_size,
        };
        header.validate_layout(file_size)?;
        Ok(header)
    }

    fn validate_layout(&self, file_size: u64) -> Result<()> {
        let index_len = INDEX_RECORD_LEN
            .checked_mul(u64::from(self.entry_count))
            .ok_or_else(|| Error::InvalidLayout("index size overflows".into()))?;
        let index_end = self
            .index_offset
            .checked_add(index_len)
            .ok_or_else(|| Error::InvalidLayout("index end overflows".into()))?;
        if self.index_offset < HEADER_LEN || index_end > file_size {
            return Err(Error::InvalidLayout(format!(
                "index [{}, {}) outside file of {} bytes",
                self.index_offset, index_end, file_size
            )));
        }
        if self.name_table_offset < HEADER_LEN || self.name_table_offset > file_size {
            return Err(Error::InvalidLayout(format!(
                "name table at {} outside file of {} bytes",
                self.name_table_offset, file_size
            )));
        }
        let data_end = self
            .data_offset
            .checked_add(self.data_size)
            .ok_or_else(|| Error::InvalidLayout("data end overflows".into()))?;
        if self.data_offset < HEADER_LEN || data_end > file_size {
            return Err(Error::InvalidLayout(format!(
                "data region [{}, {}) outside file of {} bytes",
                self.data_offset, data_end, file_size
            )));
        }
        Ok(())
    }
}
