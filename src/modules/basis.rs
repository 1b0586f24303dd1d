//! Base height map generation from fractal noise.

use crate::noise::fractal_field;
use crate::pipeline::{Module, ModuleError};
use crate::settings::{Settings, SettingsGroup};
use crate::storage::{Array2D, Storage, HEIGHT_MAP};

use super::config::{BasisSettings, GeneralSettings};

const REQUIRED_SETTINGS: &[&str] = &[GeneralSettings::NAME, BasisSettings::NAME];

/// Writes a fresh `height_map` with values normalized to [0, 1].
#[derive(Debug, Default)]
pub struct BasisModule {
    general: GeneralSettings,
    basis: BasisSettings,
}

impl BasisModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for BasisModule {
    fn name(&self) -> &str {
        "basis"
    }

    fn required_settings(&self) -> &[&'static str] {
        REQUIRED_SETTINGS
    }

    fn apply_settings(&mut self, settings: &dyn Settings) {
        let any = settings.as_any();
        if let Some(general) = any.downcast_ref::<GeneralSettings>() {
            self.general = general.clone();
        } else if let Some(basis) = any.downcast_ref::<BasisSettings>() {
            self.basis = basis.clone();
        }
    }

    fn process(&mut self, storage: &mut Storage) -> Result<(), ModuleError> {
        let size = self.general.size;
        let field = fractal_field(size, size, &self.basis.noise_config());
        let mut map = Array2D::from_vec(size, size, field)
            .ok_or_else(|| ModuleError::InvalidInput(format!("noise field is not {size}x{size}")))?;
        map.normalize();

        tracing::debug!(size, seed = self.basis.seed, "generated basis height map");
        storage.put(HEIGHT_MAP, map);
        Ok(())
    }
}
