//! Reader and pipeline configuration.

use std::path::PathBuf;

/// Number of entries above which enumeration asks for explicit confirmation.
pub const DEFAULT_ENTRY_WARNING_LIMIT: u32 = 20_000;

/// Tuning knobs shared by [`crate::Forge`] and [`crate::Pipeline`].
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// Scratch directory for decompressed payloads and extracted surfaces.
    pub temp_dir: PathBuf,
    /// Entry count above which `enumerate` returns
    /// [`crate::Error::EntryCountExceedsLimit`] instead of parsing the index.
    pub entry_warning_limit: u32,
    /// Map containers into memory when they fit; otherwise fall back to
    /// buffered reads.
    pub use_memory_mapping: bool,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("scimitar"),
            entry_warning_limit: DEFAULT_ENTRY_WARNING_LIMIT,
            use_memory_mapping: true,
        }
    }
}

impl ForgeConfig {
    /// Use `dir` as the scratch directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Override the enumeration confirmation limit.
    #[must_use]
    pub fn with_entry_warning_limit(mut self, limit: u32) -> Self {
        self.entry_warning_limit = limit;
        self
    }

    /// Force buffered reads even for small containers.
    #[must_use]
    pub fn without_memory_mapping(mut self) -> Self {
        self.use_memory_mapping = false;
        self
    }
}
