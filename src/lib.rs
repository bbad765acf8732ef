// Logsmith - lib.rs
//
// Library entry point. Logging initialisation helper:
//   - verbosity parsing (names, 0-4, v/vv/vvv)
//   - log file selection with advisory locking and `path.N` fallback
//   - a registry of module names whose levels can be read and changed live
//
// The binary in `main.rs` is a small demonstration front-end.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

pub use crate::app::options::{AsLoggingOptions, LoggingArgs, LoggingOptions};
pub use crate::app::setup::{
    init_file_logging, init_logging, init_logging_options, init_logging_options_like,
    init_structured_logging, LoggingHandle, LoggingSetup,
};
pub use crate::core::levels::{LevelBackend, LevelTable, Leveled, ModuleFilter};
pub use crate::core::registry::LevelRegistry;
pub use crate::core::sink::{FileSink, SinkPolicy, SinkWriter};
pub use crate::core::verbosity::Verbosity;
pub use crate::util::error::{ConfigError, LoggingError, RegistryError, Result, SinkError};
pub use crate::util::logging::ColourMode;
