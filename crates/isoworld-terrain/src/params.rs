//! Generation parameters and the planet-level profile they are derived from.

use std::fmt;
use std::str::FromStr;

use isoworld_grid::BiomeId;
use serde::{Deserialize, Serialize};

/// Height-field strategy used by [`crate::TerrainSynthesizer::generate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationMode {
    #[default]
    Default,
    Archipelago,
    Mountainous,
    Crater,
    Volcanic,
    Alien,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 6] = [
        GenerationMode::Default,
        GenerationMode::Archipelago,
        GenerationMode::Mountainous,
        GenerationMode::Crater,
        GenerationMode::Volcanic,
        GenerationMode::Alien,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GenerationMode::Default => "default",
            GenerationMode::Archipelago => "archipelago",
            GenerationMode::Mountainous => "mountainous",
            GenerationMode::Crater => "crater",
            GenerationMode::Volcanic => "volcanic",
            GenerationMode::Alien => "alien",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown generation mode: {0:?} (expected one of default, archipelago, mountainous, crater, volcanic, alien)")]
pub struct ParseModeError(pub String);

impl FromStr for GenerationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

/// Inputs to one synthesis pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub seed: u64,
    /// Mean surface temperature in degrees Celsius.
    pub base_temperature: f64,
    pub base_humidity: f64,
    pub roughness: f64,
    pub water_level: f64,
    pub resource_richness: f64,
    /// Base frequency of the terrain noise, in cycles per tile.
    pub noise_scale: f64,
    /// Assign this biome everywhere instead of selecting per tile.
    pub forced_biome: Option<BiomeId>,
    pub mode: GenerationMode,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            base_temperature: 20.0,
            base_humidity: 0.5,
            roughness: 0.5,
            water_level: 0.3,
            resource_richness: 0.5,
            noise_scale: 0.05,
            forced_biome: None,
            mode: GenerationMode::Default,
        }
    }
}

impl GenerationParameters {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Clamps unit-valued fields into `[0, 1]` and replaces a non-positive or
    /// non-finite noise scale with the default. A non-finite base temperature
    /// falls back to the default as well.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.base_humidity = clamp_unit(self.base_humidity);
        self.roughness = clamp_unit(self.roughness);
        self.water_level = clamp_unit(self.water_level);
        self.resource_richness = clamp_unit(self.resource_richness);
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            self.noise_scale = defaults.noise_scale;
        }
        if !self.base_temperature.is_finite() {
            self.base_temperature = defaults.base_temperature;
        }
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Planet-level description supplied by the game layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetProfile {
    pub seed: u64,
    pub average_temperature: f64,
    /// Living planets carry more atmospheric moisture.
    pub has_life: bool,
    /// Fraction of the surface expected under water, `[0, 1]`.
    pub water_coverage: f64,
    pub resource_richness: f64,
    pub mode: GenerationMode,
}

impl Default for PlanetProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            average_temperature: 20.0,
            has_life: true,
            water_coverage: 0.3,
            resource_richness: 0.5,
            mode: GenerationMode::Default,
        }
    }
}

impl PlanetProfile {
    pub fn to_parameters(&self) -> GenerationParameters {
        GenerationParameters {
            seed: self.seed,
            base_temperature: self.average_temperature,
            base_humidity: if self.has_life { 0.6 } else { 0.25 },
            water_level: 0.15 + 0.5 * clamp_unit(self.water_coverage),
            resource_richness: self.resource_richness,
            mode: self.mode,
            ..GenerationParameters::default()
        }
        .sanitized()
    }
}
