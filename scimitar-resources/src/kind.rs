//! Resource kinds and their binary markers.

use std::fmt;

/// Every resource kind that can be located inside a decompressed payload.
///
/// Each kind owns a fixed 32-bit type identifier, stored little-endian at
/// the start of the resource; that four-byte sequence is the marker the
/// locator scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Mesh,
    TextureMap,
    TextureSet,
    BuildTable,
    Universe,
    World,
    LodSelector,
    Material,
    Mipmap,
    LocalizationManager,
    LocalizationPackage,
    CompressedLocalizationData,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Mesh,
        ResourceKind::TextureMap,
        ResourceKind::TextureSet,
        ResourceKind::BuildTable,
        ResourceKind::Universe,
        ResourceKind::World,
        ResourceKind::LodSelector,
        ResourceKind::Material,
        ResourceKind::Mipmap,
        ResourceKind::LocalizationManager,
        ResourceKind::LocalizationPackage,
        ResourceKind::CompressedLocalizationData,
    ];

    /// 32-bit type identifier for this kind.
    pub fn type_id(self) -> u32 {
        match self {
            ResourceKind::Mesh => 0x415D_9568,
            ResourceKind::TextureMap => 0x1323_7FE9,
            ResourceKind::TextureSet => 0xA2B7_E917,
            ResourceKind::BuildTable => 0x22EC_BE63,
            ResourceKind::Universe => 0xFB9A_6C7F,
            ResourceKind::World => 0x78F5_E44D,
            ResourceKind::LodSelector => 0x91D5_2C2F,
            ResourceKind::Material => 0x33E2_BD46,
            ResourceKind::Mipmap => 0x5C44_A1B7,
            ResourceKind::LocalizationManager => 0x82E4_1AC9,
            ResourceKind::LocalizationPackage => 0x2C51_F11A,
            ResourceKind::CompressedLocalizationData => 0x9BD1_C032,
        }
    }

    /// Kind for a 32-bit type identifier, if recognized.
    pub fn from_type_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_id() == id)
    }

    /// Marker byte sequence as it appears in a payload.
    pub fn marker(self) -> [u8; 4] {
        self.type_id().to_le_bytes()
    }

    /// Kinds surfaced to users by default when filtering located resources.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            ResourceKind::Mesh
                | ResourceKind::TextureMap
                | ResourceKind::TextureSet
                | ResourceKind::LodSelector
        )
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::Mesh => "Mesh",
            ResourceKind::TextureMap => "Texture Map",
            ResourceKind::TextureSet => "Texture Set",
            ResourceKind::BuildTable => "Build Table",
            ResourceKind::Universe => "Universe",
            ResourceKind::World => "World",
            ResourceKind::LodSelector => "LOD Selector",
            ResourceKind::Material => "Material",
            ResourceKind::Mipmap => "Mipmap",
            ResourceKind::LocalizationManager => "Localization Manager",
            ResourceKind::LocalizationPackage => "Localization Package",
            ResourceKind::CompressedLocalizationData => "Compressed Localization Data",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
