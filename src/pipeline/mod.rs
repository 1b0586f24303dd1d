//! Pipeline engine: the module contract, the instrumentation sink and the
//! generator that runs modules in order.
//!
//! Modules run strictly one after another. A generator validates every
//! settings group, then for each module applies its settings, checks that
//! its input data exists and processes it. The first failure ends the run.

mod generator;
mod logger;
mod module;

pub use generator::{GenerationError, Generator, RunState, RunSummary};
pub use logger::{format_pipeline, EventLog, LogEvent, Logger, MemoryLogger, TracingLogger};
pub use module::{Module, ModuleError};
