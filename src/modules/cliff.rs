//! Cliff terraces: snaps the height map onto a set of seeded levels.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::noise::{fractal_field, FractalNoiseConfig};
use crate::pipeline::{Module, ModuleError};
use crate::settings::{Settings, SettingsGroup};
use crate::storage::{Array2D, Storage, HEIGHT_MAP};

use super::config::{CliffSettings, GeneralSettings};

const REQUIRED_SETTINGS: &[&str] = &[GeneralSettings::NAME, CliffSettings::NAME];
const REQUIRED_DATA: &[&str] = &[HEIGHT_MAP];

/// Frequency of the edge distortion noise across the map.
const DISTORTION_FREQUENCY: f32 = 8.0;

/// Turns smooth slopes into flat terraces separated by cliffs.
///
/// Each height is offset by a `grain`-scaled noise field and then lowered to
/// the nearest terrace level at or below it. Levels are spread over [0, 1)
/// with seeded jitter, so the same seed always gives the same terraces.
#[derive(Debug, Default)]
pub struct CliffModule {
    general: GeneralSettings,
    cliff: CliffSettings,
    levels: Vec<f32>,
}

impl CliffModule {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Generates ascending terrace levels in [0, 1), the first at 0.0.
///
/// # Arguments
/// * `count` - Number of levels
/// * `seed` - Seed for the per-level jitter
///
/// # Returns
/// `count` strictly increasing levels
pub fn terrace_levels(count: u32, seed: i32) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u32 as u64);
    let step = 1.0 / count.max(1) as f32;

    (0..count)
        .map(|i| {
            let base = i as f32 * step;
            if i == 0 {
                base
            } else {
                // Jitter stays below half a step, keeping levels ordered.
                base + rng.random::<f32>() * step * 0.5
            }
        })
        .collect()
}

/// Lowers `height` to the highest level not above it.
fn snap(height: f32, levels: &[f32]) -> f32 {
    let idx = levels.partition_point(|&level| level <= height);
    levels[idx.saturating_sub(1)]
}

impl Module for CliffModule {
    fn name(&self) -> &str {
        "cliff"
    }

    fn required_settings(&self) -> &[&'static str] {
        REQUIRED_SETTINGS
    }

    fn required_data(&self) -> &[&'static str] {
        REQUIRED_DATA
    }

    fn apply_settings(&mut self, settings: &dyn Settings) {
        let any = settings.as_any();
        if let Some(general) = any.downcast_ref::<GeneralSettings>() {
            self.general = general.clone();
        } else if let Some(cliff) = any.downcast_ref::<CliffSettings>() {
            self.cliff = cliff.clone();
        }
    }

    fn init(&mut self) {
        self.levels = terrace_levels(self.cliff.levels, self.cliff.seed);
    }

    fn process(&mut self, storage: &mut Storage) -> Result<(), ModuleError> {
        if !self.cliff.enabled {
            tracing::debug!("cliff module disabled, height map unchanged");
            return Ok(());
        }

        let size = self.general.size;
        let map = storage
            .get_mut::<Array2D<f32>>(HEIGHT_MAP)
            .ok_or_else(|| ModuleError::WrongDataType(HEIGHT_MAP.to_string()))?;
        if map.width() != size || map.height() != size {
            return Err(ModuleError::InvalidInput(format!(
                "height map is {}x{}, expected {size}x{size}",
                map.width(),
                map.height()
            )));
        }

        let distortion = if self.cliff.grain > 0.0 {
            let config = FractalNoiseConfig {
                octaves: self.cliff.octaves,
                frequency: DISTORTION_FREQUENCY,
                lacunarity: 2.0,
                persistence: 0.5,
                seed: self.cliff.seed,
            };
            fractal_field(size, size, &config)
        } else {
            vec![0.0; size * size]
        };

        let grain = self.cliff.grain;
        let levels = &self.levels;
        map.as_mut_slice()
            .par_iter_mut()
            .zip(distortion.par_iter())
            .for_each(|(height, &offset)| {
                let distorted = (*height + offset * grain).clamp(0.0, 1.0);
                *height = snap(distorted, levels);
            });

        tracing::debug!(levels = self.levels.len(), "applied cliff terraces");
        Ok(())
    }

    fn deinit(&mut self) {
        self.levels = Vec::new();
    }
}
