//! Forge container reading and the async extraction pipeline.
//!
//! A forge file is a single container holding many named, individually
//! compressed units of game data. [`Forge`] gives random access to the raw
//! units; [`Pipeline`] layers decompression, resource location, and mesh and
//! texture extraction on top, running the heavy work off the async executor.
//!
//! # Example
//!
//! ```no_run
//! use scimitar_forge::{Forge, ForgeConfig};
//! use scimitar_rdb::Game;
//!
//! # fn main() -> scimitar_forge::Result<()> {
//! let forge = Forge::open("DataPC.forge", Game::Odyssey, ForgeConfig::default())?;
//! for entry in forge.enumerate()?.iter() {
//!     println!("{} ({} bytes)", entry.name, entry.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod format;
pub mod forge;
pub mod pipeline;

pub use config::ForgeConfig;
pub use entry::ForgeEntry;
pub use error::{Error, Result};
pub use format::{ForgeHeader, FORGE_MAGIC, FORGE_VERSION, HEADER_LEN, INDEX_RECORD_LEN};
pub use forge::Forge;
pub use pipeline::{BulkReport, Pipeline};
