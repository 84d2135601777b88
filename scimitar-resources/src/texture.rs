//! Texture surface parsing, DDS assembly, and PNG conversion.
//!
//! Surface parsing is strict: a bad header or short pixel data is a hard
//! error. Conversion to PNG is best effort: a surface that decodes to DDS but
//! cannot be converted is reported as [`TextureOutcome::Failed`] rather than
//! aborting the caller.

use std::fs;
use std::path::{Path, PathBuf};

use scimitar_rdb::Game;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ioutils::TableReader;
use crate::kind::ResourceKind;
use crate::locate::ResourceLocation;
use crate::mesh::formats_for;

const FOURCC_DXT1: u32 = 0x3154_5844;
const FOURCC_DXT5: u32 = 0x3554_5844;

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
const DDSD_LINEARSIZE: u32 = 0x8_0000;
const DDPF_FOURCC: u32 = 0x4;
const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x40_0000;

/// Every surface filename suffix any supported game writes, probed in order.
const SURFACE_SUFFIXES: &[&str] = &["", "_TopMip_0", "_Mip0"];

/// What became of one texture extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureOutcome {
    /// DDS written and converted to PNG.
    Converted { surface: PathBuf, image: PathBuf },
    /// DDS written (when possible) but the PNG conversion did not succeed.
    Failed { surface: Option<PathBuf> },
}

#[derive(Debug)]
struct Surface {
    width: u32,
    height: u32,
    mip_count: u32,
    fourcc: u32,
    data: Vec<u8>,
}

fn parse_surface(data: &[u8], location: &ResourceLocation, game: Game) -> Result<Surface> {
    if location.kind != ResourceKind::TextureMap {
        return Err(Error::WrongResourceKind {
            expected: ResourceKind::TextureMap,
            found: location.kind,
        });
    }
    let start = usize::try_from(location.offset)
        .map_err(|_| Error::MalformedResource("surface offset exceeds buffer".into()))?;
    if start >= data.len() {
        return Err(Error::MalformedResource(
            "surface offset exceeds buffer".into(),
        ));
    }

    let mut reader = TableReader::new(&data[start..]);
    reader.take(4)?; // kind marker

    let version = reader.read_u16le()?;
    if version != 1 {
        return Err(Error::UnsupportedSurfaceVersion(version));
    }
    let pad = formats_for(game).texture_header_pad();
    if pad > 0 {
        reader.take(pad)?;
    }

    let width = reader.read_u32le()?;
    let height = reader.read_u32le()?;
    let mip_count = reader.read_u32le()?;
    if mip_count == 0 {
        return Err(Error::MalformedResource(
            "surface declares zero mip levels".into(),
        ));
    }
    let fourcc = reader.read_u32le()?;
    if fourcc != FOURCC_DXT1 && fourcc != FOURCC_DXT5 {
        return Err(Error::UnknownSurfaceFormat(fourcc));
    }
    let data_size = reader.read_u32le()? as usize;

    // Dimensions are untrusted; the top mip must fit the declared pixel
    // data before anything is sized from width * height.
    if width == 0 || height == 0 {
        return Err(Error::MalformedResource(
            "surface declares zero dimensions".into(),
        ));
    }
    let block_bytes: u64 = if fourcc == FOURCC_DXT1 { 8 } else { 16 };
    let needed = u64::from(width.div_ceil(4)) * u64::from(height.div_ceil(4)) * block_bytes;
    if needed > data_size as u64 {
        return Err(Error::MalformedResource(format!(
            "surface {width}x{height} needs {needed} bytes, header declares {data_size}"
        )));
    }

    let pixels = reader.take(data_size)?;

    debug!(width, height, mip_count, "parsed surface header");
    Ok(Surface {
        width,
        height,
        mip_count,
        fourcc,
        data: pixels.to_vec(),
    })
}

/// Assemble a 128-byte DDS header for a parsed surface.
fn dds_header(surface: &Surface) -> [u8; 128] {
    let mut flags = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_LINEARSIZE;
    let mut caps = DDSCAPS_TEXTURE;
    if surface.mip_count > 1 {
        flags |= DDSD_MIPMAPCOUNT;
        caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
    }

    let mut header = [0u8; 128];
    header[0..4].copy_from_slice(b"DDS ");
    let mut put = |at: usize, v: u32| header[at..at + 4].copy_from_slice(&v.to_le_bytes());
    put(4, 124);
    put(8, flags);
    put(12, surface.height);
    put(16, surface.width);
    put(20, surface.data.len() as u32);
    put(28, surface.mip_count);
    // pixel format
    put(76, 32);
    put(80, DDPF_FOURCC);
    put(84, surface.fourcc);
    put(108, caps);
    header
}

fn surface_suffix(surface: &Surface, game: Game) -> &'static str {
    if surface.mip_count > 1 {
        formats_for(game).top_mip_suffix()
    } else {
        ""
    }
}

fn convert_surface(surface: &Surface, png_path: &Path) -> Result<()> {
    let width = surface.width as usize;
    let height = surface.height as usize;
    let mut pixels = vec![0u32; width * height];
    let decode = match surface.fourcc {
        FOURCC_DXT1 => texture2ddecoder::decode_bc1,
        FOURCC_DXT5 => texture2ddecoder::decode_bc3,
        other => return Err(Error::UnknownSurfaceFormat(other)),
    };
    decode(&surface.data, width, height, &mut pixels)
        .map_err(|e| Error::ConversionUnavailable(e.to_string()))?;

    // Decoder output is packed ARGB words; PNG wants RGBA bytes.
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        rgba.extend_from_slice(&[
            (p >> 16) as u8,
            (p >> 8) as u8,
            p as u8,
            (p >> 24) as u8,
        ]);
    }
    let image = image::RgbaImage::from_raw(surface.width, surface.height, rgba)
        .ok_or_else(|| Error::ConversionUnavailable("pixel buffer size mismatch".into()))?;
    image
        .save(png_path)
        .map_err(|e| Error::ConversionUnavailable(e.to_string()))?;
    Ok(())
}

/// Extract one texture map to `temp_dir`.
///
/// The DDS surface is always written when the header parses; the PNG
/// conversion is attempted on top of it. Conversion failure is an outcome,
/// not an error.
pub fn extract_texture(
    data: &[u8],
    location: &ResourceLocation,
    game: Game,
    temp_dir: &Path,
    name: &str,
) -> Result<TextureOutcome> {
    let surface = parse_surface(data, location, game)?;
    let suffix = surface_suffix(&surface, game);
    let surface_path = temp_dir.join(format!("{name}{suffix}.dds"));

    let mut dds = Vec::with_capacity(128 + surface.data.len());
    dds.extend_from_slice(&dds_header(&surface));
    dds.extend_from_slice(&surface.data);
    fs::write(&surface_path, &dds)?;

    let png_path = surface_path.with_extension("png");
    match convert_surface(&surface, &png_path) {
        Ok(()) => Ok(TextureOutcome::Converted {
            surface: surface_path,
            image: png_path,
        }),
        Err(e) => {
            warn!(name, error = %e, "surface written but conversion failed");
            Ok(TextureOutcome::Failed {
                surface: Some(surface_path),
            })
        }
    }
}

/// Find a previously written DDS surface for `name`, whichever suffix it used.
pub fn locate_surface(temp_dir: &Path, name: &str) -> Option<PathBuf> {
    SURFACE_SUFFIXES
        .iter()
        .map(|suffix| temp_dir.join(format!("{name}{suffix}.dds")))
        .find(|path| path.is_file())
}

/// Parse a texture set resource into the file ids of its member maps.
pub fn extract_texture_set(data: &[u8], location: &ResourceLocation) -> Result<Vec<u64>> {
    if location.kind != ResourceKind::TextureSet {
        return Err(Error::WrongResourceKind {
            expected: ResourceKind::TextureSet,
            found: location.kind,
        });
    }
    let start = usize::try_from(location.offset)
        .map_err(|_| Error::MalformedResource("set offset exceeds buffer".into()))?;
    if start >= data.len() {
        return Err(Error::MalformedResource("set offset exceeds buffer".into()));
    }

    let mut reader = TableReader::new(&data[start..]);
    reader.take(4)?;
    let count = reader.read_u32le()?;
    let mut ids = Vec::with_capacity((count as usize).min(reader.remaining() / 8));
    for _ in 0..count {
        ids.push(reader.read_u64le()?);
    }
    Ok(ids)
}
