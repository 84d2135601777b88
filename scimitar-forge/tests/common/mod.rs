//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use scimitar_forge::{FORGE_MAGIC, FORGE_VERSION, HEADER_LEN, INDEX_RECORD_LEN};
use scimitar_rdb::{BLOCK_HEADER_LEN, METHOD_DEFLATE, METHOD_LZ4, RAW_DATA_MARKER};

/// Route test tracing through the env filter; repeat calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One unit to place in a fixture container.
pub struct FixtureUnit {
    pub file_id: u64,
    /// `None` omits the unit from the name table.
    pub name: Option<&'static str>,
    pub data: Vec<u8>,
    /// Overrides the data-region offset the index records for this unit.
    pub index_offset_override: Option<u64>,
    /// Overrides the size the index records for this unit.
    pub index_size_override: Option<u32>,
}

impl FixtureUnit {
    pub fn named(file_id: u64, name: &'static str, data: Vec<u8>) -> Self {
        Self {
            file_id,
            name: Some(name),
            data,
            index_offset_override: None,
            index_size_override: None,
        }
    }
}

/// Write a well-formed container holding `units`, in order.
pub fn write_forge(path: &Path, units: &[FixtureUnit]) {
    // Lay out the data region first so index offsets are known.
    let mut data_region = Vec::new();
    let mut offsets = Vec::with_capacity(units.len());
    for unit in units {
        offsets.push(data_region.len() as u64);
        data_region.extend_from_slice(&unit.data);
    }

    let mut index = Vec::new();
    for (unit, &offset) in units.iter().zip(&offsets) {
        index.extend_from_slice(&unit.file_id.to_le_bytes());
        index.extend_from_slice(
            &unit.index_offset_override.unwrap_or(offset).to_le_bytes(),
        );
        let size = unit
            .index_size_override
            .unwrap_or(unit.data.len() as u32);
        index.extend_from_slice(&size.to_le_bytes());
    }
    assert_eq!(index.len() as u64, INDEX_RECORD_LEN * units.len() as u64);

    let mut names = Vec::new();
    for unit in units {
        if let Some(name) = unit.name {
            names.extend_from_slice(&unit.file_id.to_le_bytes());
            names.extend_from_slice(&(name.len() as u16).to_le_bytes());
            names.extend_from_slice(name.as_bytes());
        }
    }

    let index_offset = HEADER_LEN;
    let name_table_offset = index_offset + index.len() as u64;
    let data_offset = name_table_offset + names.len() as u64;

    let mut file = Vec::new();
    file.extend_from_slice(&FORGE_MAGIC);
    file.extend_from_slice(&FORGE_VERSION.to_le_bytes());
    file.extend_from_slice(&(units.len() as u32).to_le_bytes());
    file.extend_from_slice(&index_offset.to_le_bytes());
    file.extend_from_slice(&name_table_offset.to_le_bytes());
    file.extend_from_slice(&data_offset.to_le_bytes());
    file.extend_from_slice(&(data_region.len() as u64).to_le_bytes());
    file.resize(HEADER_LEN as usize, 0);
    file.extend_from_slice(&index);
    file.extend_from_slice(&names);
    file.extend_from_slice(&data_region);

    std::fs::write(path, file).unwrap();
}

/// Wrap a compressed body in the two-marker raw-data block layout.
pub fn wrap_raw_block(method: u8, body: &[u8]) -> Vec<u8> {
    let mut raw = vec![0xCD; 4];
    raw.extend_from_slice(&RAW_DATA_MARKER);
    raw.extend_from_slice(&[0x00, 0x01]);
    raw.extend_from_slice(&RAW_DATA_MARKER);
    raw.extend_from_slice(&[0u8; BLOCK_HEADER_LEN as usize]);
    raw.push(method);
    raw.extend_from_slice(body);
    raw
}

/// A complete deflate-family unit holding `data`.
pub fn deflate_unit(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut body = Vec::new();
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&compressed);
    wrap_raw_block(METHOD_DEFLATE, &body)
}

/// A complete LZ4-family unit holding `data`.
pub fn lz4_unit(data: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress(data);
    let mut body = Vec::new();
    body.extend_from_slice(&(data.len() as u32).to_le_bytes());
    body.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    body.extend_from_slice(&compressed);
    wrap_raw_block(METHOD_LZ4, &body)
}

/// A single-LOD mesh resource payload at offset 0, in the legacy layout
/// (version 3, 16-bit indices).
pub fn odyssey_mesh_payload() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&scimitar_resources::ResourceKind::Mesh.marker());
    data.extend_from_slice(&3u16.to_le_bytes());
    data.push(1); // one level
    data.extend_from_slice(&3u32.to_le_bytes()); // vertices
    data.extend_from_slice(&1u32.to_le_bytes()); // faces
    data.push(0x00); // no normals
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            data.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        data.extend_from_slice(&i.to_le_bytes());
    }
    data
}

/// A single-mip 4x4 DXT1 texture map payload at offset 0, legacy layout.
pub fn odyssey_texture_payload() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&scimitar_resources::ResourceKind::TextureMap.marker());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&4u32.to_le_bytes()); // width
    data.extend_from_slice(&4u32.to_le_bytes()); // height
    data.extend_from_slice(&1u32.to_le_bytes()); // mips
    data.extend_from_slice(&0x3154_5844u32.to_le_bytes()); // DXT1
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data
}
