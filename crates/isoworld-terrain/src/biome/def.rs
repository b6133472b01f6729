//! Biome definition: environmental envelope plus tile and decoration distributions.

use std::collections::BTreeMap;

use isoworld_grid::{BiomeId, Decoration, TileType};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Total weights at or below this are treated as zero.
const WEIGHT_EPSILON: f64 = 1e-6;

/// A decoration that a biome may spawn on its tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationTemplate {
    pub id: u32,
    pub name: String,
    /// Independent spawn probability per roll, in `[0, 1]`.
    pub probability: f64,
    pub min_scale: f32,
    pub max_scale: f32,
    pub animated: bool,
}

impl DecorationTemplate {
    pub fn new(id: u32, name: impl Into<String>, probability: f64) -> Self {
        Self {
            id,
            name: name.into(),
            probability: probability.clamp(0.0, 1.0),
            min_scale: 1.0,
            max_scale: 1.0,
            animated: false,
        }
    }

    /// Sets the scale range, swapping the bounds if given out of order.
    pub fn with_scale(mut self, min: f32, max: f32) -> Self {
        self.min_scale = min.min(max);
        self.max_scale = min.max(max);
        self
    }

    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }

    fn sanitize(&mut self) {
        self.probability = if self.probability.is_nan() {
            0.0
        } else {
            self.probability.clamp(0.0, 1.0)
        };
        if self.min_scale > self.max_scale {
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }
    }
}

/// A named environmental envelope with its own tile and decoration distribution.
///
/// Temperature is in degrees Celsius; humidity and elevation are unit values.
/// All ranges are inclusive. Fields are only writable through setters, which
/// keep `min <= max`, clamp unit ranges and reject negative weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    id: BiomeId,
    name: String,
    description: String,
    min_temperature: f64,
    max_temperature: f64,
    min_humidity: f64,
    max_humidity: f64,
    min_elevation: f64,
    max_elevation: f64,
    hazard_level: f64,
    resource_level: f64,
    tile_weights: BTreeMap<TileType, f64>,
    decorations: Vec<DecorationTemplate>,
}

impl Biome {
    /// Creates a biome accepting any climate, with no tiles or decorations.
    pub fn new(id: BiomeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            min_temperature: -100.0,
            max_temperature: 200.0,
            min_humidity: 0.0,
            max_humidity: 1.0,
            min_elevation: 0.0,
            max_elevation: 1.0,
            hazard_level: 0.0,
            resource_level: 0.5,
            tile_weights: BTreeMap::new(),
            decorations: Vec::new(),
        }
    }

    pub fn id(&self) -> BiomeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn min_temperature(&self) -> f64 {
        self.min_temperature
    }

    pub fn max_temperature(&self) -> f64 {
        self.max_temperature
    }

    pub fn min_humidity(&self) -> f64 {
        self.min_humidity
    }

    pub fn max_humidity(&self) -> f64 {
        self.max_humidity
    }

    pub fn min_elevation(&self) -> f64 {
        self.min_elevation
    }

    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    pub fn hazard_level(&self) -> f64 {
        self.hazard_level
    }

    pub fn resource_level(&self) -> f64 {
        self.resource_level
    }

    pub fn tile_weights(&self) -> &BTreeMap<TileType, f64> {
        &self.tile_weights
    }

    pub fn decorations(&self) -> &[DecorationTemplate] {
        &self.decorations
    }

    /// Sets the temperature range, swapping the bounds if given out of order.
    pub fn set_temperature_range(&mut self, min: f64, max: f64) {
        self.min_temperature = min.min(max);
        self.max_temperature = min.max(max);
    }

    /// Sets the humidity range, clamped to `[0, 1]` and swapped if out of order.
    pub fn set_humidity_range(&mut self, min: f64, max: f64) {
        let (min, max) = unit_range(min, max);
        self.min_humidity = min;
        self.max_humidity = max;
    }

    /// Sets the elevation range, clamped to `[0, 1]` and swapped if out of order.
    pub fn set_elevation_range(&mut self, min: f64, max: f64) {
        let (min, max) = unit_range(min, max);
        self.min_elevation = min;
        self.max_elevation = max;
    }

    pub fn set_hazard_level(&mut self, level: f64) {
        self.hazard_level = clamp_unit(level);
    }

    pub fn set_resource_level(&mut self, level: f64) {
        self.resource_level = clamp_unit(level);
    }

    /// Sets the selection weight of a tile type. Negative or NaN weights are stored as zero.
    pub fn set_tile_weight(&mut self, kind: TileType, weight: f64) {
        let weight = if weight.is_nan() { 0.0 } else { weight.max(0.0) };
        self.tile_weights.insert(kind, weight);
    }

    pub fn add_decoration(&mut self, mut template: DecorationTemplate) {
        template.sanitize();
        self.decorations.push(template);
    }

    /// Re-applies every setter invariant; used after deserializing untrusted data.
    pub(crate) fn sanitize(&mut self) {
        self.set_temperature_range(self.min_temperature, self.max_temperature);
        self.set_humidity_range(self.min_humidity, self.max_humidity);
        self.set_elevation_range(self.min_elevation, self.max_elevation);
        self.set_hazard_level(self.hazard_level);
        self.set_resource_level(self.resource_level);
        self.tile_weights.retain(|_, w| !w.is_nan() && *w >= 0.0);
        for template in &mut self.decorations {
            template.sanitize();
        }
    }

    /// `true` iff all three values fall within their inclusive ranges.
    pub fn matches(&self, temperature: f64, humidity: f64, elevation: f64) -> bool {
        (self.min_temperature..=self.max_temperature).contains(&temperature)
            && (self.min_humidity..=self.max_humidity).contains(&humidity)
            && (self.min_elevation..=self.max_elevation).contains(&elevation)
    }

    /// Draws a tile type proportionally to the weight map.
    ///
    /// An empty map yields [`TileType::Empty`]; a map whose weights sum to
    /// (nearly) zero yields its first entry without consuming randomness.
    pub fn select_weighted_tile_type<R: Rng + ?Sized>(&self, rng: &mut R) -> TileType {
        let Some((&first, _)) = self.tile_weights.iter().next() else {
            return TileType::Empty;
        };

        let total: f64 = self.tile_weights.values().sum();
        if total <= WEIGHT_EPSILON {
            return first;
        }

        let mut roll = rng.random::<f64>() * total;
        let mut last_positive = first;
        for (&kind, &weight) in &self.tile_weights {
            if weight <= 0.0 {
                continue;
            }
            if roll < weight {
                return kind;
            }
            roll -= weight;
            last_positive = kind;
        }
        last_positive
    }

    /// Runs an independent Bernoulli trial per decoration template, stopping once
    /// `max_count` decorations have been accepted.
    pub fn roll_decorations<R: Rng + ?Sized>(&self, max_count: usize, rng: &mut R) -> Vec<Decoration> {
        let mut accepted = Vec::new();
        for template in &self.decorations {
            if accepted.len() >= max_count {
                break;
            }
            if rng.random::<f64>() < template.probability {
                let scale = if template.max_scale > template.min_scale {
                    rng.random_range(template.min_scale..=template.max_scale)
                } else {
                    template.min_scale
                };
                accepted.push(Decoration {
                    id: template.id,
                    name: template.name.clone(),
                    scale,
                    animated: template.animated,
                });
            }
        }
        accepted
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn unit_range(a: f64, b: f64) -> (f64, f64) {
    let (a, b) = (clamp_unit(a), clamp_unit(b));
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_biome() -> Biome {
        let mut biome = Biome::new(BiomeId(3), "test");
        biome.set_temperature_range(-10.0, 30.0);
        biome.set_humidity_range(0.2, 0.8);
        biome.set_elevation_range(0.3, 0.6);
        biome
    }

    #[test]
    fn test_matches_is_inclusive() {
        let biome = sample_biome();
        assert!(biome.matches(-10.0, 0.2, 0.3));
        assert!(biome.matches(30.0, 0.8, 0.6));
        assert!(biome.matches(10.0, 0.5, 0.45));
        assert!(!biome.matches(30.1, 0.5, 0.45));
        assert!(!biome.matches(10.0, 0.81, 0.45));
        assert!(!biome.matches(10.0, 0.5, 0.29));
    }

    #[test]
    fn test_inverted_ranges_are_swapped() {
        let mut biome = Biome::new(BiomeId(0), "swap");
        biome.set_temperature_range(50.0, -20.0);
        assert_eq!(biome.min_temperature(), -20.0);
        assert_eq!(biome.max_temperature(), 50.0);

        biome.set_humidity_range(0.9, 0.1);
        assert_eq!((biome.min_humidity(), biome.max_humidity()), (0.1, 0.9));
    }

    #[test]
    fn test_unit_ranges_are_clamped() {
        let mut biome = Biome::new(BiomeId(0), "clamp");
        biome.set_humidity_range(-0.5, 1.5);
        biome.set_elevation_range(2.0, 0.4);
        assert_eq!((biome.min_humidity(), biome.max_humidity()), (0.0, 1.0));
        assert_eq!((biome.min_elevation(), biome.max_elevation()), (0.4, 1.0));
        biome.set_hazard_level(3.0);
        assert_eq!(biome.hazard_level(), 1.0);
    }

    #[test]
    fn test_negative_weights_stored_as_zero() {
        let mut biome = Biome::new(BiomeId(0), "weights");
        biome.set_tile_weight(TileType::Sand, -2.0);
        assert_eq!(biome.tile_weights()[&TileType::Sand], 0.0);
    }

    #[test]
    fn test_empty_weight_map_yields_empty() {
        let biome = Biome::new(BiomeId(0), "nothing");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(biome.select_weighted_tile_type(&mut rng), TileType::Empty);
    }

    #[test]
    fn test_zero_total_weight_yields_first_entry() {
        let mut biome = Biome::new(BiomeId(0), "zeros");
        biome.set_tile_weight(TileType::Stone, 0.0);
        biome.set_tile_weight(TileType::Grass, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // BTreeMap order follows tag order: Grass precedes Stone.
        assert_eq!(biome.select_weighted_tile_type(&mut rng), TileType::Grass);
    }

    #[test]
    fn test_weighted_selection_follows_weights() {
        let mut biome = Biome::new(BiomeId(0), "mix");
        biome.set_tile_weight(TileType::Grass, 3.0);
        biome.set_tile_weight(TileType::Sand, 1.0);
        biome.set_tile_weight(TileType::Snow, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let mut grass = 0;
        let mut sand = 0;
        for _ in 0..4000 {
            match biome.select_weighted_tile_type(&mut rng) {
                TileType::Grass => grass += 1,
                TileType::Sand => sand += 1,
                other => panic!("zero-weight type selected: {other:?}"),
            }
        }
        let ratio = grass as f64 / sand as f64;
        assert!((2.4..3.8).contains(&ratio), "grass/sand ratio {ratio}");
    }

    #[test]
    fn test_roll_decorations_respects_cap_and_scale() {
        let mut biome = Biome::new(BiomeId(0), "decor");
        for i in 0..5 {
            biome.add_decoration(DecorationTemplate::new(i, format!("d{i}"), 1.0).with_scale(2.0, 0.5));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let rolled = biome.roll_decorations(3, &mut rng);
        assert_eq!(rolled.len(), 3);
        for d in &rolled {
            assert!((0.5..=2.0).contains(&d.scale), "scale {} out of range", d.scale);
        }
        assert!(biome.roll_decorations(0, &mut rng).is_empty());
    }

    #[test]
    fn test_zero_probability_never_spawns() {
        let mut biome = Biome::new(BiomeId(0), "barren");
        biome.add_decoration(DecorationTemplate::new(1, "never", 0.0));
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..100 {
            assert!(biome.roll_decorations(3, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_sanitize_repairs_deserialized_data() {
        let mut biome = sample_biome();
        biome.min_temperature = 40.0;
        biome.max_temperature = -40.0;
        biome.min_humidity = -1.0;
        biome.tile_weights.insert(TileType::Lava, -5.0);
        biome.sanitize();
        assert_eq!(biome.min_temperature(), -40.0);
        assert_eq!(biome.min_humidity(), 0.0);
        assert!(!biome.tile_weights().contains_key(&TileType::Lava));
    }
}
