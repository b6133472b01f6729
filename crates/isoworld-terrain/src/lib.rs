//! Procedural surface generation: noise fields, biome data and selection, the
//! multi-pass terrain synthesizer, and the chunk coordinator that streams
//! synthesis over a worker pool.

mod noise_field;
mod params;
mod seed;

pub mod biome;
pub mod chunk;
pub mod synthesizer;

pub use biome::{
    Biome, BiomeCatalog, BiomeCatalogError, DecorationTemplate, default_catalog, select_biome,
};
pub use chunk::{
    ChunkCoordinate, ChunkCoordinator, ChunkCoordinatorConfig, ChunkState, chunk_to_tile,
    tile_to_chunk,
};
pub use noise_field::{FractalParams, NoiseField};
pub use params::{GenerationMode, GenerationParameters, ParseModeError, PlanetProfile};
pub use seed::{ChunkSeeding, derive_chunk_seed, hash_coords, mix_seed, splitmix64};
pub use synthesizer::{GenerationError, GenerationReport, TerrainSynthesizer};
