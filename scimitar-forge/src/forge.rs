//! Forge container reader.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use parking_lot::{Mutex, RwLock};
use scimitar_rdb::Game;
use scimitar_resources::{first_resource_kind, ResourceKind};
use tracing::{debug, trace, warn};

use crate::config::ForgeConfig;
use crate::entry::ForgeEntry;
use crate::error::{Error, Result};
use crate::format::{ForgeHeader, INDEX_RECORD_LEN};

/// Containers at or above this size are read through a buffered file handle
/// instead of a memory map.
const MMAP_SIZE_LIMIT: u64 = 2 * 1024 * 1024 * 1024;

/// How many leading bytes of a unit to probe when classifying it.
const KIND_PROBE_LEN: u32 = 512;

/// An open forge container.
///
/// Opening parses only the header; the index and name table are read on the
/// first call to [`Forge::enumerate`] and cached. Raw reads and enumeration
/// take `&self`, so a `Forge` can be shared across threads behind an [`Arc`].
pub struct Forge {
    path: PathBuf,
    name: String,
    game: Game,
    config: ForgeConfig,
    header: ForgeHeader,
    size: u64,
    mmap: Option<Mmap>,
    file: Mutex<BufReader<File>>,
    entries: RwLock<Option<Arc<Vec<ForgeEntry>>>>,
}

impl std::fmt::Debug for Forge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forge")
            .field("name", &self.name)
            .field("game", &self.game)
            .field("entry_count", &self.header.entry_count)
            .field("mapped", &self.mmap.is_some())
            .finish_non_exhaustive()
    }
}

impl Forge {
    /// Open a container and parse its header.
    pub fn open(path: impl AsRef<Path>, game: Game, config: ForgeConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();

        let mmap = if config.use_memory_mapping && size < MMAP_SIZE_LIMIT {
            // SAFETY: the map is read-only and the file is opened read-only.
            match unsafe { Mmap::map(&file) } {
                Ok(mmap) => Some(mmap),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "memory map failed, using buffered reads");
                    None
                }
            }
        } else {
            None
        };

        let mut reader = BufReader::new(file);
        let header = ForgeHeader::parse(&mut reader, size)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "forge".to_string());

        debug!(
            name = %name,
            %game,
            entries = header.entry_count,
            mapped = mmap.is_some(),
            "opened forge container"
        );

        Ok(Self {
            path,
            name,
            game,
            config,
            header,
            size,
            mmap,
            file: Mutex::new(reader),
            entries: RwLock::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem of the container, used to name scratch output.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn header(&self) -> &ForgeHeader {
        &self.header
    }

    /// Entry count declared by the header, available before enumeration.
    pub fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    /// Whether the index and name table have been parsed.
    pub fn is_fully_read(&self) -> bool {
        self.entries.read().is_some()
    }

    /// Parse and cache the index and name table.
    ///
    /// Containers declaring more entries than the configured limit are
    /// refused before any table is read; call
    /// [`Forge::enumerate_unchecked`] to proceed anyway. Repeated calls
    /// return the same cached list.
    pub fn enumerate(&self) -> Result<Arc<Vec<ForgeEntry>>> {
        if let Some(entries) = self.entries.read().as_ref() {
            return Ok(Arc::clone(entries));
        }
        if self.header.entry_count > self.config.entry_warning_limit {
            return Err(Error::EntryCountExceedsLimit {
                count: self.header.entry_count,
                limit: self.config.entry_warning_limit,
            });
        }
        self.enumerate_unchecked()
    }

    /// Parse and cache the index and name table, ignoring the entry limit.
    pub fn enumerate_unchecked(&self) -> Result<Arc<Vec<ForgeEntry>>> {
        let mut guard = self.entries.write();
        if let Some(entries) = guard.as_ref() {
            return Ok(Arc::clone(entries));
        }
        let entries = Arc::new(self.read_tables()?);
        debug!(name = %self.name, entries = entries.len(), "enumerated container");
        *guard = Some(Arc::clone(&entries));
        Ok(entries)
    }

    fn read_tables(&self) -> Result<Vec<ForgeEntry>> {
        let count = self.header.entry_count as usize;
        let index_len = INDEX_RECORD_LEN as usize * count;
        let index = self.read_at(self.header.index_offset, index_len)?;

        let names = self.read_name_table(count)?;

        let mut seen = HashMap::with_capacity(count);
        let mut entries = Vec::with_capacity(count);
        for record in index.chunks_exact(INDEX_RECORD_LEN as usize) {
            let file_id = LittleEndian::read_u64(&record[0..8]);
            let offset = LittleEndian::read_u64(&record[8..16]);
            let size = LittleEndian::read_u32(&record[16..20]);
            if seen.insert(file_id, ()).is_some() {
                return Err(Error::DuplicateEntry(file_id));
            }
            let name = match names.get(&file_id) {
                Some(name) => name.clone(),
                None => {
                    warn!(file_id, "entry missing from name table");
                    ForgeEntry::fallback_name(file_id)
                }
            };
            entries.push(ForgeEntry {
                file_id,
                name,
                offset,
                size,
            });
        }
        Ok(entries)
    }

    fn read_name_table(&self, count: usize) -> Result<HashMap<u64, String>> {
        let table_end = self.header.data_offset.min(self.size);
        let table_len = table_end.saturating_sub(self.header.name_table_offset) as usize;
        let table = self.read_at(self.header.name_table_offset, table_len)?;

        let mut names = HashMap::with_capacity(count);
        let mut pos = 0usize;
        for _ in 0..count {
            if pos + 10 > table.len() {
                warn!("name table ends early, remaining entries get id names");
                break;
            }
            let file_id = LittleEndian::read_u64(&table[pos..pos + 8]);
            let len = LittleEndian::read_u16(&table[pos + 8..pos + 10]) as usize;
            pos += 10;
            if pos + len > table.len() {
                warn!("name table record truncated, remaining entries get id names");
                break;
            }
            let name = String::from_utf8_lossy(&table[pos..pos + len]).into_owned();
            pos += len;
            names.insert(file_id, name);
        }
        Ok(names)
    }

    /// Read the raw, still-compressed bytes of one unit.
    ///
    /// Bounds are checked here, not at enumeration, so a single corrupt
    /// index record only fails the unit that carries it.
    pub fn raw_bytes(&self, entry: &ForgeEntry) -> Result<Vec<u8>> {
        trace!(name = %entry.name, size = entry.size, "reading raw unit");
        self.raw_bytes_at(entry.offset, entry.size)
    }

    /// Read an arbitrary range of the raw-data region.
    pub fn raw_bytes_at(&self, offset: u64, length: u32) -> Result<Vec<u8>> {
        offset
            .checked_add(u64::from(length))
            .filter(|&end| end <= self.header.data_size)
            .ok_or(Error::OutOfRange {
                offset,
                length: u64::from(length),
                region_size: self.header.data_size,
            })?;
        self.read_at(self.header.data_offset + offset, length as usize)
    }

    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let end = offset
            .checked_add(length as u64)
            .filter(|&end| end <= self.size)
            .ok_or(Error::OutOfRange {
                offset,
                length: length as u64,
                region_size: self.size,
            })?;

        if let Some(mmap) = &self.mmap {
            return Ok(mmap[offset as usize..end as usize].to_vec());
        }
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; length];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Find an entry by its name.
    pub fn entry_by_name(&self, name: &str) -> Result<ForgeEntry> {
        self.enumerate()?
            .iter()
            .find(|entry| entry.name == name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    /// Best-effort classification of a unit from its leading raw bytes.
    ///
    /// Compressed units usually hide their markers, so `None` is common and
    /// not an error.
    pub fn resource_kind_of(&self, entry: &ForgeEntry) -> Result<Option<ResourceKind>> {
        let probe_len = entry.size.min(KIND_PROBE_LEN);
        let probe = ForgeEntry {
            size: probe_len,
            ..entry.clone()
        };
        let bytes = self.raw_bytes(&probe)?;
        Ok(first_resource_kind(&bytes))
    }

    /// Entry names, sorted, one per line with a trailing newline.
    pub fn file_list(&self) -> Result<String> {
        let entries = self.enumerate()?;
        let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        let mut out = names.join("\n");
        out.push('\n');
        Ok(out)
    }
}
