//! Writes the final height map to disk.

use std::path::PathBuf;

use crate::export::{export_png, export_raw, PngExportOptions};
use crate::pipeline::{Module, ModuleError};
use crate::settings::{Settings, SettingsGroup};
use crate::storage::{Array2D, Storage, HEIGHT_MAP};

use super::config::{ExportFormat, ExportSettings};

/// Storage key of the path written by [`ExportModule`] (`PathBuf`).
pub const EXPORT_PATH: &str = "export_path";

const REQUIRED_SETTINGS: &[&str] = &[ExportSettings::NAME];
const REQUIRED_DATA: &[&str] = &[HEIGHT_MAP];

/// Saves `height_map` as a PNG or RAW file and records the path under
/// [`EXPORT_PATH`]. Heights are expected in [0, 1].
#[derive(Debug, Default)]
pub struct ExportModule {
    export: ExportSettings,
}

impl ExportModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Module for ExportModule {
    fn name(&self) -> &str {
        "export"
    }

    fn required_settings(&self) -> &[&'static str] {
        REQUIRED_SETTINGS
    }

    fn required_data(&self) -> &[&'static str] {
        REQUIRED_DATA
    }

    fn apply_settings(&mut self, settings: &dyn Settings) {
        if let Some(export) = settings.as_any().downcast_ref::<ExportSettings>() {
            self.export = export.clone();
        }
    }

    fn process(&mut self, storage: &mut Storage) -> Result<(), ModuleError> {
        if !self.export.enabled {
            tracing::debug!("export module disabled, nothing written");
            return Ok(());
        }

        let map = storage
            .get::<Array2D<f32>>(HEIGHT_MAP)
            .ok_or_else(|| ModuleError::WrongDataType(HEIGHT_MAP.to_string()))?;

        std::fs::create_dir_all(&self.export.directory)?;
        let path = self.export.output_path();
        match self.export.format {
            ExportFormat::Png16 => export_png(map, &path, &PngExportOptions::default())?,
            ExportFormat::Raw(format) => export_raw(map, &path, format, 0.0, 1.0)?,
        }

        tracing::info!(path = %path.display(), "exported height map");
        storage.put::<PathBuf>(EXPORT_PATH, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{expected_file_size, RawFormat};
    use tempfile::tempdir;

    fn configured(export: ExportSettings) -> ExportModule {
        let mut module = ExportModule::new();
        module.apply_settings(&export);
        module
    }

    fn storage_with_map(size: usize) -> Storage {
        let mut storage = Storage::new();
        storage.put(HEIGHT_MAP, Array2D::filled(size, size, 0.5f32));
        storage
    }

    #[test]
    fn test_writes_png_into_new_directory() {
        let dir = tempdir().unwrap();
        let directory = dir.path().join("nested").join("out");
        let mut module = configured(ExportSettings {
            directory: directory.clone(),
            name: "terrain".into(),
            ..Default::default()
        });
        let mut storage = storage_with_map(16);

        module.process(&mut storage).unwrap();

        let path = directory.join("terrain.png");
        assert!(path.exists());
        assert_eq!(storage.get::<PathBuf>(EXPORT_PATH), Some(&path));
    }

    #[test]
    fn test_writes_raw() {
        let dir = tempdir().unwrap();
        let mut module = configured(ExportSettings {
            directory: dir.path().to_path_buf(),
            name: "terrain".into(),
            format: ExportFormat::Raw(RawFormat::R32Float),
            ..Default::default()
        });
        let mut storage = storage_with_map(8);

        module.process(&mut storage).unwrap();

        let path = dir.path().join("terrain.r32");
        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, expected_file_size(8, 8, RawFormat::R32Float));
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut module = configured(ExportSettings {
            enabled: false,
            directory: dir.path().join("never"),
            ..Default::default()
        });
        let mut storage = storage_with_map(4);

        module.process(&mut storage).unwrap();
        assert!(!dir.path().join("never").exists());
        assert!(!storage.has(EXPORT_PATH));
    }
}
