//! Generator: owns settings, storage and modules, and runs the pipeline.

use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::logger::Logger;
use super::module::{Module, ModuleError};
use crate::settings::{InvalidSettings, Settings, SettingsError, SettingsRegistry};
use crate::storage::Storage;

/// Reasons a run can fail. Every failure ends the run.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Incorrect settings: {}", format_invalid(.0))]
    InvalidSettings(Vec<InvalidSettings>),
    #[error("Pipeline slot {0} has no module")]
    EmptySlot(usize),
    #[error("Module '{module}' requires missing settings: {}", .missing.join(", "))]
    MissingSettings { module: String, missing: Vec<String> },
    #[error("Module '{module}' requires missing data: {}", .missing.join(", "))]
    MissingData { module: String, missing: Vec<String> },
    #[error("Module '{module}' failed: {source}")]
    ModuleFailed {
        module: String,
        #[source]
        source: ModuleError,
    },
}

fn format_invalid(invalid: &[InvalidSettings]) -> String {
    invalid
        .iter()
        .map(|i| format!("'{}' ({})", i.name, i.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Progress of the current or last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    ValidatingSettings,
    Running,
    Succeeded,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Number of modules processed.
    pub modules: usize,
    /// Wall-clock time of the module loop.
    pub elapsed: Duration,
}

/// Builds and runs a pipeline of modules.
///
/// The generator exclusively owns every settings group, every module, the
/// storage and the logger. [`Generator::clear`] drops them all.
///
/// Runs are strictly sequential and fail fast: the first failing module
/// stops the run and later modules never start. Each call to
/// [`Generator::run`] starts again from the first module.
#[derive(Default)]
pub struct Generator {
    settings: SettingsRegistry,
    modules: Vec<Option<Box<dyn Module>>>,
    storage: Storage,
    logger: Option<Box<dyn Logger>>,
    state: RunState,
}

impl Generator {
    /// Creates an empty generator with an empty storage and no logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every settings group, module, stored payload and the logger.
    pub fn clear(&mut self) {
        self.settings.clear();
        self.modules.clear();
        self.storage.clear();
        self.logger = None;
        self.state = RunState::NotStarted;
    }

    /// Attaches the instrumentation sink, replacing any previous one.
    pub fn set_logger(&mut self, logger: Box<dyn Logger>) {
        self.logger = Some(logger);
    }

    /// Replaces the storage shared by modules.
    pub fn set_storage(&mut self, storage: Storage) {
        self.storage = storage;
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Appends a module to the end of the pipeline.
    pub fn push_back_module(&mut self, module: Box<dyn Module>) {
        self.modules.push(Some(module));
    }

    /// Appends an empty slot and returns its index. A run fails when it
    /// reaches a slot that is still empty.
    pub fn push_back_slot(&mut self) -> usize {
        self.modules.push(None);
        self.modules.len() - 1
    }

    /// Puts `module` into slot `index`, returning the module it replaced.
    /// Returns `Err(module)` if the slot does not exist.
    pub fn bind_slot(
        &mut self,
        index: usize,
        module: Box<dyn Module>,
    ) -> Result<Option<Box<dyn Module>>, Box<dyn Module>> {
        match self.modules.get_mut(index) {
            Some(slot) => Ok(slot.replace(module)),
            None => Err(module),
        }
    }

    /// Number of pipeline slots, empty ones included.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Module names in pipeline order; `None` for empty slots.
    pub fn module_names(&self) -> Vec<Option<&str>> {
        self.modules
            .iter()
            .map(|slot| slot.as_deref().map(|module| module.name()))
            .collect()
    }

    /// Registers a settings group. Order of registration does not matter.
    pub fn add_settings(&mut self, settings: Box<dyn Settings>) {
        self.settings.register(settings);
    }

    pub fn settings(&self) -> &SettingsRegistry {
        &self.settings
    }

    /// Loads registered settings groups from a JSON document.
    /// See [`SettingsRegistry::load_from_value`].
    pub fn load_settings_value(&mut self, config: &serde_json::Value) -> usize {
        self.settings.load_from_value(config)
    }

    /// Loads registered settings groups from a JSON file.
    ///
    /// Only failing to read the file is an error; a malformed document is
    /// ignored like in [`SettingsRegistry::load_from_str`].
    pub fn load_settings(&mut self, path: &Path) -> Result<usize, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.settings.load_from_str(&text))
    }

    /// Writes every registered settings group to a JSON file.
    pub fn save_settings(&self, path: &Path, pretty: bool) -> Result<(), SettingsError> {
        let text = self.settings.to_json_string(pretty)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Checks all settings groups, reporting each invalid one to the logger.
    pub fn is_correct(&mut self) -> bool {
        self.check_settings().is_ok()
    }

    /// State of the current or last run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the pipeline and reports only success or failure.
    /// The cause of a failure goes to the logger.
    pub fn generate(&mut self) -> bool {
        self.run().is_ok()
    }

    /// Runs the pipeline.
    ///
    /// Validates every settings group, then processes each module in order.
    /// Before a module runs its required settings are applied and its
    /// required data keys are checked. The first failure stops the run.
    pub fn run(&mut self) -> Result<RunSummary, GenerationError> {
        let result = self.run_inner();
        self.state = if result.is_ok() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        result
    }

    fn run_inner(&mut self) -> Result<RunSummary, GenerationError> {
        if let Some(logger) = self.logger.as_deref_mut() {
            let names: Vec<Option<&str>> = self
                .modules
                .iter()
                .map(|slot| slot.as_deref().map(|module| module.name()))
                .collect();
            logger.draw_pipeline(&names);
        }

        self.state = RunState::ValidatingSettings;
        self.check_settings()?;

        self.state = RunState::Running;
        self.log_message("Generation started.");
        let start = Instant::now();

        for index in 0..self.modules.len() {
            self.run_module(index)?;
        }

        let elapsed = start.elapsed();
        self.log_message("Generation ended.");
        self.log_message(&format!("Time elapsed: {:.3} sec.", elapsed.as_secs_f64()));

        Ok(RunSummary {
            modules: self.modules.len(),
            elapsed,
        })
    }

    fn check_settings(&mut self) -> Result<(), GenerationError> {
        let invalid = self.settings.validate_all();
        if invalid.is_empty() {
            return Ok(());
        }
        for entry in &invalid {
            let message = format!("Incorrect settings: '{}'. {}", entry.name, entry.reason);
            self.log_error(None, &message);
        }
        Err(GenerationError::InvalidSettings(invalid))
    }

    fn run_module(&mut self, index: usize) -> Result<(), GenerationError> {
        let Self {
            settings,
            modules,
            storage,
            logger,
            ..
        } = self;
        let mut logger = logger.as_deref_mut();

        let Some(module) = modules[index].as_deref_mut() else {
            if let Some(logger) = logger.as_deref_mut() {
                logger.log_error(None, &format!("Module not found in slot {index}."));
            }
            return Err(GenerationError::EmptySlot(index));
        };
        let name = module.name().to_string();
        tracing::debug!(module = %name, index, "starting module");

        if let Some(logger) = logger.as_deref_mut() {
            logger.module_started(&name);
        }

        let missing: Vec<String> = module
            .required_settings()
            .iter()
            .filter(|key| !settings.contains(key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            if let Some(logger) = logger.as_deref_mut() {
                for key in &missing {
                    logger.log_error(Some(&name), &format!("No settings with key '{key}'."));
                }
            }
            return Err(GenerationError::MissingSettings {
                module: name,
                missing,
            });
        }
        let required: Vec<&'static str> = module.required_settings().to_vec();
        for key in required {
            if let Some(entry) = settings.get(key) {
                module.apply_settings(entry);
            }
        }

        module.init();

        let missing: Vec<String> = module
            .required_data()
            .iter()
            .filter(|key| !storage.has(key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            if let Some(logger) = logger.as_deref_mut() {
                for key in &missing {
                    logger.log_error(Some(&name), &format!("No data with key '{key}'."));
                }
            }
            module.deinit();
            return Err(GenerationError::MissingData {
                module: name,
                missing,
            });
        }

        if let Err(source) = module.process(storage) {
            if let Some(logger) = logger.as_deref_mut() {
                logger.log_error(Some(&name), &format!("Processing failed: {source}"));
            }
            module.deinit();
            return Err(GenerationError::ModuleFailed {
                module: name,
                source,
            });
        }
        module.deinit();

        if let Some(logger) = logger.as_deref_mut() {
            logger.module_ended(&name);
        }
        Ok(())
    }

    fn log_message(&mut self, message: &str) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.log_message(message);
        }
    }

    fn log_error(&mut self, module: Option<&str>, message: &str) {
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.log_error(module, message);
        }
    }
}
