//! Multi-octave fractal Brownian motion (fBm) over a 2D grid.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (4-8 typical).
    pub octaves: u8,
    /// Features across the longer side of the grid at the first octave.
    pub frequency: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 4.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Samples fractal noise for every cell of a `width × height` grid.
///
/// Each octave is a single simdnoise layer with its own seed offset; the
/// layers are summed with decaying amplitude and normalized by the
/// amplitude sum, giving values in approximately [-1, 1]. Octaves stop once
/// the frequency is no longer finite or a layer yields non-finite samples.
///
/// # Arguments
/// * `width` - Grid width in cells
/// * `height` - Grid height in cells
/// * `config` - Octave count, base frequency, lacunarity, persistence and seed
///
/// # Returns
/// Row-major values, one per cell
pub fn fractal_field(width: usize, height: usize, config: &FractalNoiseConfig) -> Vec<f32> {
    let mut total = vec![0.0f32; width * height];
    if total.is_empty() || config.octaves == 0 {
        return total;
    }

    // Grid coordinates are cell indices, so scale the frequency to the grid.
    let mut frequency = config.frequency / width.max(height) as f32;
    let mut amplitude = 1.0f32;
    let mut max_amplitude = 0.0f32;

    for octave in 0..config.octaves {
        if !(frequency * width.max(height) as f32).is_finite() {
            tracing::debug!(octave, "noise frequency overflowed, dropping remaining octaves");
            break;
        }
        let octave_seed = config.seed.wrapping_add(octave as i32 * 31337);
        let layer = NoiseBuilder::fbm_2d(width, height)
            .with_seed(octave_seed)
            .with_freq(frequency)
            .with_octaves(1)
            .generate()
            .0;
        if layer.iter().any(|v| !v.is_finite()) {
            tracing::debug!(octave, "noise layer is not finite, dropping remaining octaves");
            break;
        }

        total
            .par_iter_mut()
            .zip(layer.par_iter())
            .for_each(|(t, &v)| *t += v * amplitude);

        max_amplitude += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    if max_amplitude > 0.0 {
        total.par_iter_mut().for_each(|t| *t /= max_amplitude);
    }
    total
}
