//! Settings groups consumed by the built-in modules.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::export::RawFormat;
use crate::noise::FractalNoiseConfig;
use crate::settings::SettingsGroup;

/// Settings shared by every module that produces or edits maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Side length of generated maps in cells. [2, 8192].
    pub size: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self { size: 257 }
    }
}

impl SettingsGroup for GeneralSettings {
    const NAME: &'static str = "general";

    fn check(&self) -> Result<(), String> {
        if !(2..=8192).contains(&self.size) {
            return Err(format!("size must be in [2, 8192], got {}", self.size));
        }
        Ok(())
    }
}

/// Parameters of the base fractal height map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasisSettings {
    /// Random seed. Any value.
    pub seed: i32,
    /// Noise octaves. [1, 16].
    pub octaves: u8,
    /// Features across the map at the first octave. (0, ...).
    pub frequency: f32,
    /// Frequency multiplier per octave. [1.0, ...).
    pub lacunarity: f32,
    /// Amplitude decay per octave. (0.0, 1.0].
    pub persistence: f32,
}

impl Default for BasisSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 8,
            frequency: 4.0,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl BasisSettings {
    /// Default parameters with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Broad, gently rolling terrain.
    pub fn smooth(seed: i32) -> Self {
        Self {
            seed,
            octaves: 4,
            frequency: 2.0,
            lacunarity: 2.0,
            persistence: 0.4,
        }
    }

    /// Rugged, detailed terrain.
    pub fn rough(seed: i32) -> Self {
        Self {
            seed,
            octaves: 10,
            frequency: 6.0,
            lacunarity: 2.1,
            persistence: 0.6,
        }
    }

    pub fn noise_config(&self) -> FractalNoiseConfig {
        FractalNoiseConfig {
            octaves: self.octaves,
            frequency: self.frequency,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
            seed: self.seed,
        }
    }
}

impl SettingsGroup for BasisSettings {
    const NAME: &'static str = "basis";

    fn check(&self) -> Result<(), String> {
        if !(1..=16).contains(&self.octaves) {
            return Err(format!("octaves must be in [1, 16], got {}", self.octaves));
        }
        if self.frequency.is_nan() || self.frequency <= 0.0 {
            return Err(format!("frequency must be positive, got {}", self.frequency));
        }
        if self.lacunarity.is_nan() || self.lacunarity < 1.0 {
            return Err(format!("lacunarity must be at least 1.0, got {}", self.lacunarity));
        }
        if self.persistence.is_nan() || self.persistence <= 0.0 || self.persistence > 1.0 {
            return Err(format!("persistence must be in (0.0, 1.0], got {}", self.persistence));
        }
        Ok(())
    }
}

/// Upper bound on terrace levels: one per 16-bit output step.
pub const MAX_CLIFF_LEVELS: u32 = 65536;

/// Cliff terrace settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliffSettings {
    /// Module enabled.
    pub enabled: bool,
    /// Octaves of the edge distortion noise. Fewer means bigger details. [1, 16].
    pub octaves: u8,
    /// Count of cliff levels. [1, 65536].
    pub levels: u32,
    /// Random seed. Any value.
    pub seed: i32,
    /// Strength of the edge distortion. [0.0, 1.0].
    pub grain: f32,
}

impl Default for CliffSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            octaves: 3,
            levels: 8,
            seed: 0,
            grain: 0.0325,
        }
    }
}

impl SettingsGroup for CliffSettings {
    const NAME: &'static str = "cliff";

    fn check(&self) -> Result<(), String> {
        if !(1..=16).contains(&self.octaves) {
            return Err(format!("octaves must be in [1, 16], got {}", self.octaves));
        }
        if !(1..=MAX_CLIFF_LEVELS).contains(&self.levels) {
            return Err(format!(
                "levels must be in [1, {MAX_CLIFF_LEVELS}], got {}",
                self.levels
            ));
        }
        if !(0.0..=1.0).contains(&self.grain) {
            return Err(format!("grain must be in [0.0, 1.0], got {}", self.grain));
        }
        Ok(())
    }
}

/// File format written by the export module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// 16-bit grayscale PNG.
    #[default]
    Png16,
    /// Headerless RAW samples.
    Raw(RawFormat),
}

/// Height map export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Module enabled.
    pub enabled: bool,
    /// Output directory, created if missing.
    pub directory: PathBuf,
    /// File name without extension.
    pub name: String,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./output"),
            name: "height_map".to_string(),
            format: ExportFormat::default(),
        }
    }
}

impl ExportSettings {
    /// Path of the file this configuration writes.
    pub fn output_path(&self) -> PathBuf {
        let extension = match self.format {
            ExportFormat::Png16 => "png",
            ExportFormat::Raw(format) => format.extension(),
        };
        self.directory.join(format!("{}.{}", self.name, extension))
    }
}

impl SettingsGroup for ExportSettings {
    const NAME: &'static str = "export";

    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.contains(['/', '\\']) {
            return Err(format!("name must not contain path separators, got '{}'", self.name));
        }
        Ok(())
    }
}
