//! Configurable module pipeline for procedural terrain generation.
//!
//! A [`Generator`] owns named settings groups, a shared [`Storage`] of
//! intermediate maps and an ordered list of [`Module`]s. Running it
//! validates every settings group, then processes the modules one by one,
//! checking each module's declared settings and data before it runs and
//! stopping at the first failure.

pub mod export;
pub mod logging;
pub mod modules;
pub mod noise;
pub mod pipeline;
pub mod settings;
pub mod storage;

pub use modules::{register_default_pipeline, BasisModule, CliffModule, ExportModule};
pub use pipeline::{GenerationError, Generator, Logger, Module, ModuleError, RunState, TracingLogger};
pub use settings::{Settings, SettingsGroup, SettingsRegistry};
pub use storage::{Array2D, Storage};
