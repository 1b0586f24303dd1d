//! Module trait implemented by every pipeline stage.

use thiserror::Error;

use crate::export::{PngExportError, RawExportError};
use crate::settings::Settings;
use crate::storage::Storage;

/// Errors a module reports from [`Module::process`].
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("No data with key '{0}'")]
    MissingData(String),
    #[error("Data with key '{0}' has an unexpected type")]
    WrongDataType(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG export failed: {0}")]
    Png(#[from] PngExportError),
    #[error("RAW export failed: {0}")]
    Raw(#[from] RawExportError),
}

/// One ordered stage of the generation pipeline.
///
/// A module declares which settings groups and storage keys it reads. The
/// generator enforces those declarations before the module runs, so
/// `process` may rely on every declared key being present.
///
/// Per run the generator calls, in order: [`apply_settings`] once per
/// required settings name, [`init`], [`process`] and [`deinit`]. `deinit`
/// runs whenever `init` ran, even if the run fails afterwards.
///
/// [`apply_settings`]: Module::apply_settings
/// [`init`]: Module::init
/// [`process`]: Module::process
/// [`deinit`]: Module::deinit
pub trait Module {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    /// Settings groups that must be registered before this module runs.
    fn required_settings(&self) -> &[&'static str] {
        &[]
    }

    /// Storage keys that earlier modules must have written.
    fn required_data(&self) -> &[&'static str] {
        &[]
    }

    /// Receives one resolved settings group.
    fn apply_settings(&mut self, _settings: &dyn Settings) {}

    /// Acquires per-run state.
    fn init(&mut self) {}

    /// Runs the stage against the shared store.
    ///
    /// The store is only handed out once every key from
    /// [`required_data`](Module::required_data) is present. Modules may
    /// write new keys freely.
    fn process(&mut self, storage: &mut Storage) -> Result<(), ModuleError>;

    /// Releases per-run state.
    fn deinit(&mut self) {}
}
