//! Height-field strategies, one per [`GenerationMode`].

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{FieldSet, NoiseLayers};
use crate::noise_field::{FractalParams, stretch};
use crate::params::{GenerationMode, GenerationParameters};

/// Fills `fields.elevation` (and the mode-specific masks) for `mode`.
pub(super) fn generate(
    fields: &mut FieldSet,
    layers: &NoiseLayers,
    fractal: &FractalParams,
    params: &GenerationParameters,
    mode: GenerationMode,
    rng: &mut ChaCha8Rng,
) {
    match mode {
        GenerationMode::Default => default_heights(fields, layers, fractal, params.roughness),
        GenerationMode::Archipelago => archipelago_heights(fields, layers, fractal),
        GenerationMode::Mountainous => mountainous_heights(fields, layers, fractal, params.roughness),
        GenerationMode::Crater => crater_heights(fields, layers, fractal, rng),
        GenerationMode::Volcanic => volcanic_heights(fields, layers, fractal, rng),
        GenerationMode::Alien => alien_heights(fields, layers, fractal),
    }
}

fn for_each_cell(fields: &mut FieldSet, mut f: impl FnMut(f64, f64) -> f64) {
    for y in 0..fields.height {
        for x in 0..fields.width {
            let i = fields.index(x, y);
            fields.elevation[i] = f(x as f64, y as f64).clamp(0.0, 1.0);
        }
    }
}

/// Single fractal pass with a power contrast curve, spread by roughness.
fn default_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams, roughness: f64) {
    let spread = 1.0 + 1.5 * roughness;
    for_each_cell(fields, |x, y| {
        let curved = layers.terrain.fractal(x, y, fractal).powf(1.3);
        (curved - 0.41) * spread + 0.45
    });
}

/// Fractal blended with inverted cellular noise and cubed, so that only cell
/// centers rise above sea level.
fn archipelago_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams) {
    let cell_scale = fractal.scale * 1.5;
    for_each_cell(fields, |x, y| {
        let f = layers.terrain.fractal(x, y, fractal);
        let c = layers.cells.cellular(x, y, cell_scale);
        let blend = 0.6 * f + 0.4 * (1.0 - c);
        blend * blend * blend * 1.6 - 0.02
    });
}

fn mountainous_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams, roughness: f64) {
    let gain = 0.8 + 0.4 * roughness;
    for_each_cell(fields, |x, y| {
        let f = layers.terrain.fractal(x, y, fractal);
        let r = layers.detail.ridged(x, y, fractal);
        (0.35 * f + 0.65 * r) * gain
    });
}

/// Near-flat plain with stamped parabolic bowls and sinusoidal rims,
/// min-max normalized afterwards.
fn crater_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams, rng: &mut ChaCha8Rng) {
    let (w, h) = (fields.width, fields.height);
    for_each_cell(fields, |x, y| 0.45 + (layers.terrain.fractal(x, y, fractal) - 0.5) * 0.1);

    let area_root = ((w * h) as f64).sqrt();
    let count = ((area_root * 0.04) as usize).max(3) + rng.random_range(0..=2usize);
    let min_dim = w.min(h) as f64;
    let min_radius = (min_dim * 0.05).max(2.0);
    let max_radius = (min_dim * 0.2).max(min_radius + 1.0);
    let rough = fractal.with_scale(fractal.scale * 4.0).with_octaves(3);

    // Heights may leave [0, 1] while stamping; normalization brings them back.
    let mut heights = fields.elevation.clone();
    for _ in 0..count {
        let cx = rng.random_range(0..w) as f64;
        let cy = rng.random_range(0..h) as f64;
        let radius = rng.random_range(min_radius..=max_radius);
        let reach = (radius * 1.15).ceil() as i64;

        for (x, y) in window(cx, cy, reach, w, h) {
            let (fx, fy) = (x as f64, y as f64);
            let dist = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
            let jitter = 2.0 * (layers.detail.fractal(fx, fy, &rough) - 0.5);
            let edge = radius * (1.0 + 0.15 * jitter);
            let d = dist / edge;
            let i = fields.index(x, y);
            if d < 0.7 {
                let t = d / 0.7;
                heights[i] -= 0.35 * (1.0 - t * t);
            } else if d <= 1.0 {
                heights[i] += 0.12 * (PI * (d - 0.7) / 0.3).sin();
            }
        }
    }

    normalize(&mut heights);
    fields.elevation = heights;
}

/// Fractal base with stamped three-segment cones; each cone writes its own
/// lava and heat falloff masks.
fn volcanic_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams, rng: &mut ChaCha8Rng) {
    let (w, h) = (fields.width, fields.height);
    for_each_cell(fields, |x, y| 0.5 * stretch(layers.terrain.fractal(x, y, fractal), 1.5));

    let area_root = ((w * h) as f64).sqrt();
    let count = ((area_root * 0.02) as usize).max(1) + rng.random_range(0..=1usize);
    let min_dim = w.min(h) as f64;
    let min_radius = (min_dim * 0.1).max(3.0);
    let max_radius = (min_dim * 0.25).max(4.0).max(min_radius);

    for _ in 0..count {
        let cx = rng.random_range(0..w) as f64;
        let cy = rng.random_range(0..h) as f64;
        let radius = rng.random_range(min_radius..=max_radius);
        let peak = rng.random_range(0.85..=1.0);
        let reach = (radius * 1.5).ceil() as i64;

        for (x, y) in window(cx, cy, reach, w, h) {
            let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            let d = dist / radius;
            let i = fields.index(x, y);

            let cone = cone_profile(d, peak);
            fields.elevation[i] = fields.elevation[i].max(cone).clamp(0.0, 1.0);

            if d < 0.25 {
                fields.lava[i] = fields.lava[i].max(1.0 - d / 0.25);
            }
            if d < 1.5 {
                fields.heat[i] = fields.heat[i].max(1.0 - d / 1.5);
            }
        }
    }
}

/// Radial volcano profile over normalized distance `d`: a sunken crater lip,
/// a steep outer slope down to 40% of the peak and a foot fading to zero.
fn cone_profile(d: f64, peak: f64) -> f64 {
    const LIP: f64 = 0.15;
    const SLOPE_END: f64 = 0.6;
    let shoulder = 0.4 * peak;
    if d < LIP {
        peak - 0.15 * (1.0 - d / LIP)
    } else if d < SLOPE_END {
        let t = (d - LIP) / (SLOPE_END - LIP);
        peak + (shoulder - peak) * t
    } else if d <= 1.0 {
        shoulder * (1.0 - (d - SLOPE_END) / (1.0 - SLOPE_END))
    } else {
        0.0
    }
}

/// Domain-warped fractal with sparse anomaly spikes; records strangeness for
/// the biome override.
fn alien_heights(fields: &mut FieldSet, layers: &NoiseLayers, fractal: &FractalParams) {
    const WARP: f64 = 12.0;
    let warp_params = fractal.with_scale(fractal.scale * 0.5).with_octaves(3);
    let anomaly_params = fractal.with_scale(fractal.scale * 2.0).with_octaves(2);
    let cell_scale = fractal.scale * 2.0;

    for y in 0..fields.height {
        for x in 0..fields.width {
            let (fx, fy) = (x as f64, y as f64);
            let wx = (layers.warp_x.fractal(fx, fy, &warp_params) - 0.5) * 2.0 * WARP;
            let wy = (layers.warp_y.fractal(fx, fy, &warp_params) - 0.5) * 2.0 * WARP;
            let base = layers.terrain.fractal(fx + wx, fy + wy, fractal);

            let anomaly = stretch(layers.detail.fractal(fx, fy, &anomaly_params), 2.0);
            let spike = if anomaly > 0.6 { ((anomaly - 0.6) / 0.4).powi(4) } else { 0.0 };

            let cell = layers.cells.cellular(fx, fy, cell_scale);
            let i = fields.index(x, y);
            fields.elevation[i] = (base + 0.5 * spike).clamp(0.0, 1.0);
            fields.strangeness[i] = ((1.0 - cell).powi(2) * 0.8 + spike).clamp(0.0, 1.0);
        }
    }
}

/// In-bounds cells of the square window of half-size `reach` around `(cx, cy)`.
fn window(cx: f64, cy: f64, reach: i64, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    let (cx, cy) = (cx as i64, cy as i64);
    let x0 = (cx - reach).max(0);
    let x1 = (cx + reach).min(w as i64 - 1);
    let y0 = (cy - reach).max(0);
    let y1 = (cy + reach).min(h as i64 - 1);
    (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x as usize, y as usize)))
}

/// Min-max normalizes to `[0, 1]`; a flat field becomes 0.5.
fn normalize(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= 1e-9 {
        values.iter_mut().for_each(|v| *v = 0.5);
        return;
    }
    for v in values {
        *v = ((*v - min) / range).clamp(0.0, 1.0);
    }
}
