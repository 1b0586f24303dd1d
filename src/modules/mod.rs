//! Built-in generation modules and their settings groups.
//!
//! The default pipeline is `basis -> cliff -> export`: a fractal noise
//! height map, optional cliff terraces, then a file on disk.

mod basis;
mod cliff;
mod config;
mod export;

pub use basis::BasisModule;
pub use cliff::{terrace_levels, CliffModule};
pub use config::{BasisSettings, CliffSettings, ExportFormat, ExportSettings, GeneralSettings};
pub use export::{ExportModule, EXPORT_PATH};

use crate::pipeline::Generator;

/// Registers every built-in settings group with default values and appends
/// the built-in modules in pipeline order.
pub fn register_default_pipeline(generator: &mut Generator) {
    generator.add_settings(Box::new(GeneralSettings::default()));
    generator.add_settings(Box::new(BasisSettings::default()));
    generator.add_settings(Box::new(CliffSettings::default()));
    generator.add_settings(Box::new(ExportSettings::default()));

    generator.push_back_module(Box::new(BasisModule::new()));
    generator.push_back_module(Box::new(CliffModule::new()));
    generator.push_back_module(Box::new(ExportModule::new()));
}
