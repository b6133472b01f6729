//! Biome system: environmental envelopes, weighted tile/decoration sampling,
//! the biome catalog, and per-tile biome selection.

mod catalog;
mod def;
mod defaults;
mod selection;

pub use catalog::{BiomeCatalog, BiomeCatalogError};
pub use def::{Biome, DecorationTemplate};
pub use defaults::default_catalog;
pub use selection::select_biome;
