//! Seeded simplex fBm for new-map heights.
//!
//! Heights are normalized by the total octave amplitude, so a map never
//! exceeds its configured height scale in either direction.

use noise::{NoiseFn, Simplex};

const OCTAVES: u32 = 4;
/// Cycles per grid vertex for the broadest octave.
const BASE_FREQUENCY: f64 = 0.03;
const GAIN: f64 = 0.5;

pub struct HeightmapSampler {
    noise: Simplex,
    octaves: u32,
}

impl HeightmapSampler {
    pub fn new(seed: u32) -> Self {
        Self::with_octaves(seed, OCTAVES)
    }

    pub fn with_octaves(seed: u32, octaves: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            octaves,
        }
    }

    /// Height at vertex `(x, z)` in `[-scale, scale]`.
    pub fn height(&self, x: f64, z: f64, scale: f32) -> f32 {
        if scale == 0.0 || self.octaves == 0 {
            return 0.0;
        }
        let (mut sum, mut norm) = (0.0, 0.0);
        let (mut frequency, mut amplitude) = (BASE_FREQUENCY, 1.0);
        for _ in 0..self.octaves {
            sum += self.noise.get([x * frequency, z * frequency]) * amplitude;
            norm += amplitude;
            frequency *= 2.0;
            amplitude *= GAIN;
        }
        (sum / norm).clamp(-1.0, 1.0) as f32 * scale
    }

    /// Row-major `side * side` vertex heights, `z` outer.
    pub fn grid(&self, side: u32, scale: f32) -> Vec<f32> {
        (0..side)
            .flat_map(|z| (0..side).map(move |x| (x, z)))
            .map(|(x, z)| self.height(f64::from(x), f64::from(z), scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        let a = HeightmapSampler::new(42).grid(17, 4.0);
        let b = HeightmapSampler::new(42).grid(17, 4.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_map() {
        let a = HeightmapSampler::new(1).grid(17, 4.0);
        let b = HeightmapSampler::new(2).grid(17, 4.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_height_within_scale() {
        let sampler = HeightmapSampler::new(0);
        for h in sampler.grid(65, 5.0) {
            assert!((-5.0..=5.0).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn test_zero_scale_is_flat() {
        let sampler = HeightmapSampler::new(7);
        assert!(sampler.grid(9, 0.0).iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let sampler = HeightmapSampler::with_octaves(7, 0);
        assert_eq!(sampler.height(1.0, 2.0, 3.0), 0.0);
    }

    #[test]
    fn test_grid_is_row_major() {
        let sampler = HeightmapSampler::new(3);
        let grid = sampler.grid(5, 2.0);
        assert_eq!(grid.len(), 25);
        assert_eq!(grid[5 + 2], sampler.height(2.0, 1.0, 2.0));
    }
}
