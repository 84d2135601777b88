//! Supported game titles.

use std::fmt;

/// The three titles whose forge containers this workspace understands.
///
/// Assigned when an archive or standalone file is opened; immutable
/// afterwards. Selects the decompressor family, the decompressed-file
/// extension, and the per-game resource layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Odyssey,
    Origins,
    Steep,
}

impl Game {
    /// File extension used for decompressed payloads of this game.
    pub fn extension(self) -> &'static str {
        match self {
            Game::Odyssey => "acod",
            Game::Origins => "acor",
            Game::Steep => "stp",
        }
    }

    /// Game for a decompressed-file extension, if recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "acod" => Some(Game::Odyssey),
            "acor" => Some(Game::Origins),
            "stp" => Some(Game::Steep),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Game::Odyssey => "Assassin's Creed: Odyssey",
            Game::Origins => "Assassin's Creed: Origins",
            Game::Steep => "Steep",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
