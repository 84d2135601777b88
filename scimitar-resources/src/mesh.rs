//! Mesh resource parsing.
//!
//! A mesh resource holds one or more levels of detail. Each level carries a
//! position table, an optional normal table, and a triangle index table.
//! Index width varies per game, which is what [`GameFormats`] abstracts.

use scimitar_rdb::Game;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ioutils::TableReader;
use crate::kind::ResourceKind;
use crate::locate::ResourceLocation;

/// A single level of detail, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Render this level alone as a Wavefront OBJ document.
    pub fn to_obj(&self) -> String {
        crate::wavefront::export(std::slice::from_ref(self))
    }
}

/// Per-game layout knobs for mesh and surface tables.
pub trait GameFormats: Send + Sync {
    /// Mesh table version this game writes.
    fn mesh_version(&self) -> u16;
    /// Whether triangle indices are 32-bit rather than 16-bit.
    fn wide_indices(&self) -> bool;
    /// Padding between the surface version field and the dimensions.
    fn texture_header_pad(&self) -> usize;
    /// Filename suffix for the top mip of a multi-mip surface.
    fn top_mip_suffix(&self) -> &'static str;
}

pub struct OdysseyFormats;
pub struct OriginsFormats;
pub struct SteepFormats;

impl GameFormats for OdysseyFormats {
    fn mesh_version(&self) -> u16 {
        3
    }
    fn wide_indices(&self) -> bool {
        false
    }
    fn texture_header_pad(&self) -> usize {
        0
    }
    fn top_mip_suffix(&self) -> &'static str {
        "_TopMip_0"
    }
}

impl GameFormats for OriginsFormats {
    fn mesh_version(&self) -> u16 {
        2
    }
    fn wide_indices(&self) -> bool {
        false
    }
    fn texture_header_pad(&self) -> usize {
        0
    }
    fn top_mip_suffix(&self) -> &'static str {
        "_TopMip_0"
    }
}

impl GameFormats for SteepFormats {
    fn mesh_version(&self) -> u16 {
        1
    }
    fn wide_indices(&self) -> bool {
        true
    }
    fn texture_header_pad(&self) -> usize {
        4
    }
    fn top_mip_suffix(&self) -> &'static str {
        "_Mip0"
    }
}

static ODYSSEY: OdysseyFormats = OdysseyFormats;
static ORIGINS: OriginsFormats = OriginsFormats;
static STEEP: SteepFormats = SteepFormats;

/// Layout table for a game.
pub fn formats_for(game: Game) -> &'static dyn GameFormats {
    match game {
        Game::Odyssey => &ODYSSEY,
        Game::Origins => &ORIGINS,
        Game::Steep => &STEEP,
    }
}

/// Parse every level of detail of a mesh resource out of `data`.
///
/// `location` must point at a [`ResourceKind::Mesh`] marker inside `data`.
/// Truncation anywhere in the tables is a hard error; meshes are all-or-nothing.
pub fn extract_meshes(
    data: &[u8],
    location: &ResourceLocation,
    game: Game,
) -> Result<Vec<Mesh>> {
    if location.kind != ResourceKind::Mesh {
        return Err(Error::WrongResourceKind {
            expected: ResourceKind::Mesh,
            found: location.kind,
        });
    }
    let formats = formats_for(game);
    let start = usize::try_from(location.offset)
        .map_err(|_| Error::MalformedResource("mesh offset exceeds buffer".into()))?;
    if start >= data.len() {
        return Err(Error::MalformedResource("mesh offset exceeds buffer".into()));
    }

    let mut reader = TableReader::new(&data[start..]);
    // Skip the 4-byte kind marker the location points at.
    reader.take(4)?;

    let version = reader.read_u16le()?;
    if version != formats.mesh_version() {
        return Err(Error::UnsupportedMeshVersion {
            found: version,
            expected: formats.mesh_version(),
        });
    }

    let lod_count = reader.read_u8()?;
    if lod_count == 0 {
        return Err(Error::MalformedResource("mesh declares zero levels".into()));
    }

    let mut meshes = Vec::with_capacity(usize::from(lod_count));
    for lod in 0..lod_count {
        let vertex_count = reader.read_u32le()? as usize;
        let face_count = reader.read_u32le()? as usize;
        let flags = reader.read_u8()?;
        let has_normals = flags & 0x01 != 0;

        // Declared counts are untrusted; cap pre-allocation by what the
        // buffer can still hold and let the reads report the truncation.
        let mut positions = Vec::with_capacity(vertex_count.min(reader.remaining() / 12));
        for _ in 0..vertex_count {
            let x = reader.read_f32le()?;
            let y = reader.read_f32le()?;
            let z = reader.read_f32le()?;
            positions.push([x, y, z]);
        }

        let normals = if has_normals {
            let mut normals = Vec::with_capacity(vertex_count.min(reader.remaining() / 12));
            for _ in 0..vertex_count {
                let x = reader.read_f32le()?;
                let y = reader.read_f32le()?;
                let z = reader.read_f32le()?;
                normals.push([x, y, z]);
            }
            Some(normals)
        } else {
            None
        };

        let face_bytes = if formats.wide_indices() { 12 } else { 6 };
        let mut faces = Vec::with_capacity(face_count.min(reader.remaining() / face_bytes));
        for _ in 0..face_count {
            let face = if formats.wide_indices() {
                [
                    reader.read_u32le()?,
                    reader.read_u32le()?,
                    reader.read_u32le()?,
                ]
            } else {
                [
                    u32::from(reader.read_u16le()?),
                    u32::from(reader.read_u16le()?),
                    u32::from(reader.read_u16le()?),
                ]
            };
            faces.push(face);
        }

        debug!(
            lod,
            vertices = vertex_count,
            faces = face_count,
            normals = has_normals,
            "parsed mesh level"
        );
        meshes.push(Mesh {
            positions,
            normals,
            faces,
        });
    }
    Ok(meshes)
}
