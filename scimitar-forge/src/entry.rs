//! Index entries.

/// One unit of the container: a named, sized slice of the data region.
///
/// `offset` is relative to the data region, not the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeEntry {
    pub file_id: u64,
    pub name: String,
    pub offset: u64,
    pub size: u32,
}

impl ForgeEntry {
    /// Name the container fell back to when the name table had no entry.
    pub(crate) fn fallback_name(file_id: u64) -> String {
        format!("{file_id:016x}")
    }
}
