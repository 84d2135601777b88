//! Async extraction pipeline.
//!
//! Each operation clones the entry it needs, moves the work onto the blocking
//! pool with [`tokio::task::spawn_blocking`], and surfaces executor failures
//! as [`Error::TaskFailed`]. Bulk extraction fans out one blocking task per
//! entry and never lets a single bad unit abort its siblings.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scimitar_rdb::decompress::decompressor_for;
use scimitar_resources::{
    extract_meshes, extract_texture, extract_texture_set, locate_resources, Mesh, ResourceKind,
    ResourceLocation, TextureOutcome,
};
use tempfile::NamedTempFile;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ForgeConfig;
use crate::entry::ForgeEntry;
use crate::error::{Error, Result};
use crate::forge::Forge;

/// Outcome of a bulk extraction run.
#[derive(Debug)]
pub struct BulkReport {
    /// Units written to the destination directory.
    pub written: usize,
    /// Units that failed, with the error each one produced.
    pub failures: Vec<(String, Error)>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives decompression and resource extraction for open containers.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ForgeConfig,
}

impl Pipeline {
    /// Create a pipeline and its scratch directory.
    pub fn new(config: ForgeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.temp_dir)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Enumerate a container off the async executor.
    pub async fn enumerate(&self, forge: &Arc<Forge>) -> Result<Arc<Vec<ForgeEntry>>> {
        let forge = Arc::clone(forge);
        run_blocking(move || forge.enumerate()).await
    }

    /// Read and decompress one unit into memory.
    pub async fn decompress_entry(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<Vec<u8>> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        run_blocking(move || decompress_unit(&forge, &entry)).await
    }

    /// Decompress one unit into the scratch directory.
    ///
    /// The output name is deterministic: the entry name with the game's
    /// extension appended. The file appears atomically or not at all.
    pub async fn decompress_entry_to_temp(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<PathBuf> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        let path = self
            .config
            .temp_dir
            .join(format!("{}.{}", output_file_name(&entry), forge.game().extension()));
        run_blocking(move || {
            let data = decompress_unit(&forge, &entry)?;
            write_atomic(&path, &data)?;
            debug!(path = %path.display(), bytes = data.len(), "wrote decompressed unit");
            Ok(path)
        })
        .await
    }

    /// Decompress one unit and scan it for resource markers.
    pub async fn locate_entry_resources(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<Vec<ResourceLocation>> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        run_blocking(move || {
            let data = decompress_unit(&forge, &entry)?;
            Ok(locate_resources(&data))
        })
        .await
    }

    /// Extract every mesh level from the first mesh resource of a unit.
    pub async fn extract_entry_meshes(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<Vec<Mesh>> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        run_blocking(move || {
            let data = decompress_unit(&forge, &entry)?;
            let location = first_of_kind(&data, ResourceKind::Mesh)?;
            Ok(extract_meshes(&data, &location, forge.game())?)
        })
        .await
    }

    /// Extract the first texture map of a unit into the scratch directory.
    pub async fn extract_entry_texture(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<TextureOutcome> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        let temp_dir = self.config.temp_dir.clone();
        run_blocking(move || {
            let data = decompress_unit(&forge, &entry)?;
            let location = first_of_kind(&data, ResourceKind::TextureMap)?;
            Ok(extract_texture(
                &data,
                &location,
                forge.game(),
                &temp_dir,
                &output_file_name(&entry),
            )?)
        })
        .await
    }

    /// List the member file ids of the first texture set of a unit.
    pub async fn extract_entry_texture_set(
        &self,
        forge: &Arc<Forge>,
        entry: &ForgeEntry,
    ) -> Result<Vec<u64>> {
        let forge = Arc::clone(forge);
        let entry = entry.clone();
        run_blocking(move || {
            let data = decompress_unit(&forge, &entry)?;
            let location = first_of_kind(&data, ResourceKind::TextureSet)?;
            Ok(extract_texture_set(&data, &location)?)
        })
        .await
    }

    /// Decompress every unit of a container into `dest`, in parallel.
    ///
    /// Units that fail are recorded in the report and do not stop the rest.
    pub async fn extract_all(&self, forge: &Arc<Forge>, dest: &Path) -> Result<BulkReport> {
        std::fs::create_dir_all(dest)?;
        let entries = self.enumerate(forge).await?;

        let mut tasks = JoinSet::new();
        for entry in entries.iter().cloned() {
            let forge = Arc::clone(forge);
            let out = dest.join(output_file_name(&entry));
            tasks.spawn_blocking(move || {
                let result = decompress_unit(&forge, &entry)
                    .and_then(|data| write_atomic(&out, &data));
                (entry.name, result)
            });
        }

        let mut report = BulkReport {
            written: 0,
            failures: Vec::new(),
        };
        while let Some(joined) = tasks.join_next().await {
            let (name, result) = joined.map_err(|e| Error::TaskFailed(e.to_string()))?;
            match result {
                Ok(()) => report.written += 1,
                Err(e) => {
                    warn!(name = %name, error = %e, "unit failed during bulk extraction");
                    report.failures.push((name, e));
                }
            }
        }
        debug!(
            written = report.written,
            failed = report.failures.len(),
            "bulk extraction finished"
        );
        Ok(report)
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskFailed(e.to_string()))?
}

/// Raw read plus decompression for one unit.
///
/// Units that carry no raw-data block are passed through unchanged; plenty of
/// container content is stored uncompressed.
fn decompress_unit(forge: &Forge, entry: &ForgeEntry) -> Result<Vec<u8>> {
    let raw = forge.raw_bytes(entry)?;
    match decompressor_for(forge.game()).decompress(&raw) {
        Ok(data) => Ok(data),
        Err(scimitar_rdb::Error::ImproperData { .. }) => Ok(raw),
        Err(e) => Err(e.into()),
    }
}

/// Entry names come straight from the container's name table and may hold
/// path syntax; output files use only the final component, so a crafted
/// name cannot land outside the chosen directory.
fn output_file_name(entry: &ForgeEntry) -> String {
    Path::new(&entry.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ForgeEntry::fallback_name(entry.file_id))
}

fn first_of_kind(data: &[u8], kind: ResourceKind) -> Result<ResourceLocation> {
    locate_resources(data)
        .into_iter()
        .find(|location| location.kind == kind)
        .ok_or(Error::ResourceMissing(kind))
}

/// Write through a sibling temp file so the destination never holds a
/// partial unit.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::InvalidLayout(format!("no parent directory for {}", path.display()))
    })?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
