//! Per-tile biome selection from climate values.

use rand::Rng;

use super::{Biome, BiomeCatalog};

/// Climate-gap weights used when no biome matches.
const TEMPERATURE_GAP_WEIGHT: f64 = 0.5;
const HUMIDITY_GAP_WEIGHT: f64 = 0.3;
const ELEVATION_GAP_WEIGHT: f64 = 0.2;

/// Floor applied to each suitability factor so edge-of-range biomes keep a chance.
const MIN_SUITABILITY: f64 = 0.1;

/// Picks the biome for a tile's temperature, humidity and elevation.
///
/// - No matching biome: the biome whose ranges are closest, by weighted gap.
/// - One match: that biome, without consuming randomness.
/// - Several matches: a draw weighted by how central the values sit in each
///   biome's ranges.
///
/// Returns `None` only for an empty catalog. Ties resolve to the earliest
/// biome in catalog order.
pub fn select_biome<'a, R: Rng + ?Sized>(
    catalog: &'a BiomeCatalog,
    temperature: f64,
    humidity: f64,
    elevation: f64,
    rng: &mut R,
) -> Option<&'a Biome> {
    let candidates: Vec<&Biome> = catalog
        .iter()
        .filter(|b| b.matches(temperature, humidity, elevation))
        .collect();

    match candidates.len() {
        0 => closest(catalog, temperature, humidity, elevation),
        1 => Some(candidates[0]),
        _ => {
            let weights: Vec<f64> = candidates
                .iter()
                .map(|b| suitability(b, temperature, humidity, elevation))
                .collect();
            let total: f64 = weights.iter().sum();
            let mut roll = rng.random::<f64>() * total;
            for (biome, weight) in candidates.iter().zip(&weights) {
                if roll < *weight {
                    return Some(*biome);
                }
                roll -= weight;
            }
            candidates.last().copied()
        }
    }
}

fn closest<'a>(catalog: &'a BiomeCatalog, temperature: f64, humidity: f64, elevation: f64) -> Option<&'a Biome> {
    let mut best: Option<(&Biome, f64)> = None;
    for biome in catalog.iter() {
        let score = TEMPERATURE_GAP_WEIGHT
            * gap(temperature, biome.min_temperature(), biome.max_temperature())
            + HUMIDITY_GAP_WEIGHT * gap(humidity, biome.min_humidity(), biome.max_humidity())
            + ELEVATION_GAP_WEIGHT * gap(elevation, biome.min_elevation(), biome.max_elevation());
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((biome, score));
        }
    }
    best.map(|(b, _)| b)
}

/// Distance from `value` to the nearest point of `[min, max]`, zero inside.
fn gap(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

fn suitability(biome: &Biome, temperature: f64, humidity: f64, elevation: f64) -> f64 {
    centrality(temperature, biome.min_temperature(), biome.max_temperature())
        * centrality(humidity, biome.min_humidity(), biome.max_humidity())
        * centrality(elevation, biome.min_elevation(), biome.max_elevation())
}

/// 1 at the range midpoint, falling linearly to the floor at the edges.
fn centrality(value: f64, min: f64, max: f64) -> f64 {
    let half = (max - min) * 0.5;
    if half <= f64::EPSILON {
        return 1.0;
    }
    let mid = min + half;
    (1.0 - (value - mid).abs() / half).max(MIN_SUITABILITY)
}
