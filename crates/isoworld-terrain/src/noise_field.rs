//! Seeded scalar noise primitives.
//!
//! [`NoiseField`] wraps a gradient-noise lattice for one seed and exposes
//! multi-octave fractal noise, ridged noise and cellular (Voronoi distance)
//! noise, all remapped to `[0, 1]`. Every sample is a pure function of the
//! seed, the coordinate and the parameters.

use noise::{NoiseFn, Perlin};

use crate::seed::{hash_coords, mix_seed};

/// Octave configuration for [`NoiseField::fractal`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    /// Frequency of the first octave, in cycles per tile.
    pub scale: f64,
    /// Number of octaves to sum.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            scale: 0.05,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FractalParams {
    /// Same octave settings at a different base frequency.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Same settings with a different octave count.
    pub fn with_octaves(self, octaves: u32) -> Self {
        Self { octaves, ..self }
    }
}

/// Seeded noise source.
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: u64,
    lattice: Perlin,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            seed,
            lattice: Perlin::new(folded),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A decorrelated field for a secondary layer (warp, jitter, ...).
    pub fn derive(&self, salt: u64) -> Self {
        Self::new(mix_seed(self.seed, salt))
    }

    /// Multi-octave fractal noise in `[0, 1]`.
    ///
    /// Sums `octaves` layers of gradient noise at increasing frequency and
    /// decreasing amplitude, normalizes by the total amplitude and remaps the
    /// signed result to the unit interval.
    pub fn fractal(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let mut total = 0.0;
        let mut frequency = params.scale;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..params.octaves {
            total += self.lattice.get([x * frequency, y * frequency]) * amplitude;
            max_amplitude += amplitude;
            frequency *= params.lacunarity;
            amplitude *= params.persistence;
        }

        if max_amplitude <= 0.0 {
            return 0.5;
        }
        ((total / max_amplitude + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Ridged noise in `[0, 1]`: `(1 - |2n - 1|)²` over contrast-stretched
    /// fractal noise, peaking along the mid-level contour lines.
    pub fn ridged(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let n = stretch(self.fractal(x, y, params), 2.5);
        let ridge = 1.0 - (2.0 * n - 1.0).abs();
        ridge * ridge
    }

    /// Cellular noise in `[0, 1]`: normalized distance from the sample to the
    /// nearest feature point, one pseudo-random point per unit cell.
    pub fn cellular(&self, x: f64, y: f64, scale: f64) -> f64 {
        let px = x * scale;
        let py = y * scale;
        let cell_x = px.floor() as i64;
        let cell_y = py.floor() as i64;

        let mut nearest = f64::INFINITY;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cx = cell_x + dx;
                let cy = cell_y + dy;
                let h = hash_coords(self.seed, cx, cy);
                let fx = (h & 0xFFFF_FFFF) as f64 / 4_294_967_296.0;
                let fy = (h >> 32) as f64 / 4_294_967_296.0;
                let ddx = cx as f64 + fx - px;
                let ddy = cy as f64 + fy - py;
                nearest = nearest.min((ddx * ddx + ddy * ddy).sqrt());
            }
        }

        (nearest / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
    }
}

/// Contrast-stretches a unit value around 0.5 by `factor`, clamped to `[0, 1]`.
pub(crate) fn stretch(value: f64, factor: f64) -> f64 {
    ((value - 0.5) * factor + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractal_is_deterministic() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        let params = FractalParams::default();
        for i in 0..100 {
            let (x, y) = (i as f64 * 1.7, i as f64 * -0.3);
            assert_eq!(a.fractal(x, y, &params), b.fractal(x, y, &params));
        }
    }

    #[test]
    fn test_fractal_within_unit_range() {
        let field = NoiseField::new(7);
        let params = FractalParams::default();
        for x in 0..64 {
            for y in 0..64 {
                let v = field.fractal(x as f64, y as f64, &params);
                assert!((0.0..=1.0).contains(&v), "{v} out of range at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_zero_octaves_is_midpoint() {
        let field = NoiseField::new(1);
        let params = FractalParams::default().with_octaves(0);
        assert_eq!(field.fractal(3.3, 4.4, &params), 0.5);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(999);
        let params = FractalParams::default();
        let differs = (0..50).any(|i| {
            let x = i as f64 * 3.1 + 0.25;
            a.fractal(x, x * 0.5, &params) != b.fractal(x, x * 0.5, &params)
        });
        assert!(differs, "seeds 1 and 999 produced identical samples");
    }

    #[test]
    fn test_derived_field_is_decorrelated() {
        let base = NoiseField::new(5);
        let derived = base.derive(1);
        assert_ne!(base.seed(), derived.seed());
        assert_eq!(derived.seed(), base.derive(1).seed());
    }

    #[test]
    fn test_cellular_range_and_determinism() {
        let field = NoiseField::new(11);
        for x in -20..20 {
            for y in -20..20 {
                let v = field.cellular(x as f64 + 0.5, y as f64 + 0.5, 0.2);
                assert!((0.0..=1.0).contains(&v));
                assert_eq!(v, field.cellular(x as f64 + 0.5, y as f64 + 0.5, 0.2));
            }
        }
    }

    #[test]
    fn test_cellular_has_spread() {
        let field = NoiseField::new(3);
        let samples: Vec<f64> = (0..400)
            .map(|i| field.cellular((i % 20) as f64, (i / 20) as f64, 0.3))
            .collect();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.2, "cellular noise is nearly flat: {min}..{max}");
    }

    #[test]
    fn test_ridged_within_unit_range() {
        let field = NoiseField::new(21);
        let params = FractalParams::default();
        for i in 0..200 {
            let v = field.ridged(i as f64 * 0.7, i as f64 * 1.3, &params);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_stretch_clamps() {
        assert_eq!(stretch(0.5, 3.0), 0.5);
        assert_eq!(stretch(1.0, 3.0), 1.0);
        assert_eq!(stretch(0.0, 3.0), 0.0);
        assert!((stretch(0.6, 2.0) - 0.7).abs() < 1e-12);
    }
}
