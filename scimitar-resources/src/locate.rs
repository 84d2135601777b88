//! Locating resources inside a decompressed payload.

use scimitar_rdb::scan::{MarkerTable, scan_buffer};
use tracing::trace;

use crate::ResourceKind;

/// A located resource: an offset into the scanned buffer plus a kind tag.
///
/// Locations are indices, not independent objects; they are only meaningful
/// against the buffer they were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLocation {
    pub offset: u64,
    pub kind: ResourceKind,
}

fn resource_marker_table() -> MarkerTable {
    let mut table = MarkerTable::new();
    for kind in ResourceKind::ALL {
        table = table.with_marker(kind.type_id(), kind.marker());
    }
    table
}

/// Scan a decompressed buffer for every known resource marker.
///
/// Matches are reported in file order, not grouped by kind. Scanning is
/// pure: the same buffer always yields the same, order-stable result.
pub fn locate_resources(data: &[u8]) -> Vec<ResourceLocation> {
    let table = resource_marker_table();
    let locations: Vec<ResourceLocation> = scan_buffer(data, &table)
        .into_iter()
        .filter_map(|hit| {
            ResourceKind::from_type_id(hit.marker).map(|kind| ResourceLocation {
                offset: hit.offset,
                kind,
            })
        })
        .collect();
    trace!("located {} resource(s)", locations.len());
    locations
}

/// Kind of the first resource in a buffer, if any.
///
/// Used to classify standalone decompressed files and for best-effort entry
/// hinting.
pub fn first_resource_kind(data: &[u8]) -> Option<ResourceKind> {
    locate_resources(data).first().map(|l| l.kind)
}
