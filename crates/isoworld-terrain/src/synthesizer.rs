//! Multi-pass terrain synthesis over a caller-owned [`Grid`].
//!
//! A [`TerrainSynthesizer`] is built from immutable [`GenerationParameters`] and a
//! shared [`BiomeCatalog`]. Each [`TerrainSynthesizer::generate`] call runs the
//! full pipeline:
//!
//! 1. height field for the selected [`GenerationMode`]
//! 2. temperature and humidity fields
//! 3. elevation bands, temperature and humidity conversions on the tiles
//! 4. biome distribution and border smoothing
//! 5. resources, points of interest and decorations
//! 6. water bodies and rivers
//!
//! The RNG is re-seeded from the parameter seed at the start of every call, so
//! repeated calls with the same inputs produce identical grids.

mod biomes;
mod climate;
mod features;
mod heightfield;
mod water;

use std::sync::Arc;

use isoworld_grid::Grid;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biome::BiomeCatalog;
use crate::noise_field::{FractalParams, NoiseField};
use crate::params::{GenerationMode, GenerationParameters};

/// Errors returned by [`TerrainSynthesizer::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The grid has no cells to generate into.
    #[error("cannot generate into an empty {width}x{height} grid")]
    EmptyGrid { width: usize, height: usize },
}

/// Summary of one synthesis pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Mode the height field was built with.
    pub mode: GenerationMode,
    /// Rivers carved from high ground.
    pub rivers: usize,
    /// Ruins, craters and rock formations stamped.
    pub points_of_interest: usize,
    /// Tiles converted to mineral deposits.
    pub mineral_deposits: usize,
    /// Decorations attached across all tiles.
    pub decorations: usize,
}

/// Independent noise layers, all derived from the generation seed.
#[derive(Clone, Debug)]
pub(crate) struct NoiseLayers {
    pub terrain: NoiseField,
    pub detail: NoiseField,
    pub warp_x: NoiseField,
    pub warp_y: NoiseField,
    pub climate: NoiseField,
    pub moisture: NoiseField,
    pub cells: NoiseField,
}

impl NoiseLayers {
    fn new(seed: u64) -> Self {
        let terrain = NoiseField::new(seed);
        Self {
            detail: terrain.derive(1),
            warp_x: terrain.derive(2),
            warp_y: terrain.derive(3),
            climate: terrain.derive(4),
            moisture: terrain.derive(5),
            cells: terrain.derive(6),
            terrain,
        }
    }
}

/// Per-cell scalar fields computed before any tile is touched.
///
/// `lava` and `heat` are only non-zero in volcanic mode, `strangeness` only in
/// alien mode.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FieldSet {
    pub width: usize,
    pub height: usize,
    pub elevation: Vec<f64>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub lava: Vec<f64>,
    pub heat: Vec<f64>,
    pub strangeness: Vec<f64>,
}

impl FieldSet {
    fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            elevation: vec![0.0; n],
            temperature: vec![0.0; n],
            humidity: vec![0.0; n],
            lava: vec![0.0; n],
            heat: vec![0.0; n],
            strangeness: vec![0.0; n],
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn len(&self) -> usize {
        self.elevation.len()
    }
}

/// Procedural terrain generator for one parameter set.
pub struct TerrainSynthesizer {
    params: GenerationParameters,
    catalog: Arc<BiomeCatalog>,
    layers: NoiseLayers,
    rng: ChaCha8Rng,
}

impl TerrainSynthesizer {
    /// Creates a synthesizer. Out-of-range parameters are clamped.
    pub fn new(params: GenerationParameters, catalog: Arc<BiomeCatalog>) -> Self {
        let params = params.sanitized();
        Self {
            layers: NoiseLayers::new(params.seed),
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            params,
            catalog,
        }
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn catalog(&self) -> &BiomeCatalog {
        &self.catalog
    }

    pub fn seed(&self) -> u64 {
        self.params.seed
    }

    /// Switches to a new seed, rebuilding every noise layer.
    pub fn reseed(&mut self, seed: u64) {
        self.params.seed = seed;
        self.layers = NoiseLayers::new(seed);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Populates `grid` with terrain using the height strategy for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::EmptyGrid`] if either dimension is zero.
    pub fn generate(&mut self, grid: &mut Grid, mode: GenerationMode) -> Result<GenerationReport, GenerationError> {
        let (width, height) = (grid.width(), grid.height());
        if width == 0 || height == 0 {
            return Err(GenerationError::EmptyGrid { width, height });
        }

        let span = tracing::debug_span!("terrain_generate", seed = self.params.seed, %mode, width, height);
        let _enter = span.enter();

        self.rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        let mut report = GenerationReport {
            mode,
            ..GenerationReport::default()
        };

        let fields = self.compute_fields(width, height, mode);

        climate::apply_elevation_bands(grid, &fields, self.params.water_level);
        climate::apply_temperature(grid, &fields, self.params.water_level, mode, &mut self.rng);
        climate::apply_humidity(grid);

        biomes::distribute(grid, &fields, &self.params, &self.catalog, mode, &mut self.rng);
        biomes::smooth_borders(grid, &self.catalog, &mut self.rng);

        report.mineral_deposits = features::place_resources(grid, self.params.resource_richness, &mut self.rng);
        report.points_of_interest = features::place_points_of_interest(grid, &mut self.rng);
        report.decorations = features::place_decorations(grid, &self.catalog, &mut self.rng);

        water::fill_water_bodies(grid, &fields, self.params.water_level);
        report.rivers = water::carve_rivers(grid, &fields);

        tracing::debug!(
            rivers = report.rivers,
            pois = report.points_of_interest,
            minerals = report.mineral_deposits,
            decorations = report.decorations,
            "Terrain generated"
        );
        Ok(report)
    }

    fn compute_fields(&mut self, width: usize, height: usize, mode: GenerationMode) -> FieldSet {
        let mut fields = FieldSet::new(width, height);
        let fractal = FractalParams::default().with_scale(self.params.noise_scale);
        heightfield::generate(&mut fields, &self.layers, &fractal, &self.params, mode, &mut self.rng);
        climate::compute_temperature(&mut fields, &self.layers, &fractal, &self.params, mode);
        climate::compute_humidity(&mut fields, &self.layers, &fractal, &self.params);
        fields
    }
}
