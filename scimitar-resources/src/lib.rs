//! Resource location and extraction for decompressed forge payloads.
//!
//! A decompressed payload embeds sub-resources (meshes, texture maps,
//! texture sets, localization blocks) announced by fixed four-byte markers.
//! This crate finds them and converts the ones users care about into usable
//! artifacts: polygon meshes with a Wavefront OBJ serialization, and
//! block-compressed DDS surfaces with an optional PNG display conversion.

pub mod error;
mod ioutils;
pub mod kind;
pub mod locate;
pub mod mesh;
pub mod texture;
pub mod wavefront;

pub use error::{Error, Result};
pub use kind::ResourceKind;
pub use locate::{ResourceLocation, first_resource_kind, locate_resources};
pub use mesh::{GameFormats, Mesh, extract_meshes, formats_for};
pub use texture::{
    TextureOutcome, extract_texture, extract_texture_set, locate_surface,
};
