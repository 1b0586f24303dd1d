//! Instrumentation sink for pipeline lifecycle and diagnostics.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives lifecycle events and diagnostics from the generator.
pub trait Logger {
    /// Called once per run, before settings validation, with the module
    /// names in pipeline order. Empty slots are `None`.
    fn draw_pipeline(&mut self, modules: &[Option<&str>]);

    /// Informational message.
    fn log_message(&mut self, message: &str);

    /// Error, optionally attributed to a module.
    fn log_error(&mut self, module: Option<&str>, message: &str);

    fn module_started(&mut self, module: &str);

    fn module_ended(&mut self, module: &str);
}

/// Renders a pipeline snapshot as `a -> b -> <empty>`.
pub fn format_pipeline(modules: &[Option<&str>]) -> String {
    modules
        .iter()
        .map(|module| module.unwrap_or("<empty>"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn draw_pipeline(&mut self, modules: &[Option<&str>]) {
        tracing::info!(modules = modules.len(), "pipeline: {}", format_pipeline(modules));
    }

    fn log_message(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn log_error(&mut self, module: Option<&str>, message: &str) {
        match module {
            Some(module) => tracing::error!(module, "{message}"),
            None => tracing::error!("{message}"),
        }
    }

    fn module_started(&mut self, module: &str) {
        tracing::info!(module, "module started");
    }

    fn module_ended(&mut self, module: &str) {
        tracing::info!(module, "module ended");
    }
}

/// Event captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Pipeline(Vec<Option<String>>),
    Message(String),
    Error {
        module: Option<String>,
        message: String,
    },
    ModuleStarted(String),
    ModuleEnded(String),
}

/// Shared view of the events recorded by a [`MemoryLogger`].
///
/// The generator owns the logger, so callers keep this handle to inspect
/// what was recorded.
#[derive(Debug, Default, Clone)]
pub struct EventLog(Rc<RefCell<Vec<LogEvent>>>);

impl EventLog {
    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.0.borrow().clone()
    }

    /// Error messages, in order.
    pub fn errors(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                LogEvent::Error { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names from `ModuleStarted` events, in order.
    pub fn started(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                LogEvent::ModuleStarted(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names from `ModuleEnded` events, in order.
    pub fn ended(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                LogEvent::ModuleEnded(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: LogEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    log: EventLog,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stays valid after the logger is moved into a generator.
    pub fn event_log(&self) -> EventLog {
        self.log.clone()
    }
}

impl Logger for MemoryLogger {
    fn draw_pipeline(&mut self, modules: &[Option<&str>]) {
        let names = modules.iter().map(|m| m.map(str::to_string)).collect();
        self.log.push(LogEvent::Pipeline(names));
    }

    fn log_message(&mut self, message: &str) {
        self.log.push(LogEvent::Message(message.to_string()));
    }

    fn log_error(&mut self, module: Option<&str>, message: &str) {
        self.log.push(LogEvent::Error {
            module: module.map(str::to_string),
            message: message.to_string(),
        });
    }

    fn module_started(&mut self, module: &str) {
        self.log.push(LogEvent::ModuleStarted(module.to_string()));
    }

    fn module_ended(&mut self, module: &str) {
        self.log.push(LogEvent::ModuleEnded(module.to_string()));
    }
}
