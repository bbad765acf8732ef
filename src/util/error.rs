// Logsmith - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Resource failures and programmer misuse are surfaced as distinct variants;
// out-of-range numeric verbosity is clamped and never reaches this module.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all Logsmith operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LoggingError {
    /// Log file acquisition failed.
    Sink(SinkError),

    /// Level registry was used incorrectly.
    Registry(RegistryError),

    /// Configuration loading or parsing failed.
    Config(ConfigError),

    /// A global `tracing` dispatcher was already installed.
    Install {
        source: tracing::dispatcher::SetGlobalDefaultError,
    },

    /// The installed dispatcher's layers could not be replaced.
    Reload {
        source: tracing_subscriber::reload::Error,
    },
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink(e) => write!(f, "Log file error: {e}"),
            Self::Registry(e) => write!(f, "Level registry error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Install { source } => {
                write!(f, "Failed to install logging dispatcher: {source}")
            }
            Self::Reload { source } => {
                write!(f, "Failed to replace logging layers: {source}")
            }
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sink(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Install { source } => Some(source),
            Self::Reload { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors raised while acquiring a log file.
#[derive(Debug)]
pub enum SinkError {
    /// The parent directory of the log file could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// A candidate log file could not be opened or created.
    Open { path: PathBuf, source: io::Error },

    /// The locked log file could not be reset to zero length.
    Truncate { path: PathBuf, source: io::Error },

    /// Every candidate file was locked by another holder.
    Exhausted { base: PathBuf, attempts: usize },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "Failed to create log directory '{}': {source}",
                path.display()
            ),
            Self::Open { path, source } => {
                write!(f, "Failed to open log file '{}': {source}", path.display())
            }
            Self::Truncate { path, source } => {
                write!(f, "Failed to reset log file '{}': {source}", path.display())
            }
            Self::Exhausted { base, attempts } => write!(
                f,
                "Failed to acquire a log file for '{}' after {attempts} attempts",
                base.display()
            ),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Open { source, .. } => Some(source),
            Self::Truncate { source, .. } => Some(source),
            Self::Exhausted { .. } => None,
        }
    }
}

impl From<SinkError> for LoggingError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors raised by the level registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Levels were queried or changed before a backend was bound.
    NotInitialised,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialised => write!(
                f,
                "logging has not been initialised; no level backend is bound"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<RegistryError> for LoggingError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// A verbosity string is not a name, an integer, or a run of `v`s.
    InvalidVerbosity { value: String },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVerbosity { value } => write!(
                f,
                "Invalid log level '{value}'. Expected critical, error, warning, \
                 notice, info, debug, 0-4, or v/vv/vvv"
            ),
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::InvalidVerbosity { .. } => None,
        }
    }
}

impl From<ConfigError> for LoggingError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for Logsmith results.
pub type Result<T> = std::result::Result<T, LoggingError>;
