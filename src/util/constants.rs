// Logsmith - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

use crate::core::verbosity::Verbosity;

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Logsmith";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "Logsmith";

/// Current crate version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Verbosity
// =============================================================================

/// Console verbosity when nothing else is configured.
pub const DEFAULT_VERBOSITY: Verbosity = Verbosity::Warning;

/// File verbosity when nothing else is configured.
pub const DEFAULT_FILE_VERBOSITY: Verbosity = Verbosity::Debug;

/// Level a backend reports for a module (and the root) that was never set.
pub const UNSET_MODULE_VERBOSITY: Verbosity = Verbosity::Debug;

/// Module name denoting the root / unqualified level.
pub const ROOT_MODULE: &str = "";

// =============================================================================
// File sink
// =============================================================================

/// Number of candidate files (`path`, `path.1` .. `path.9`) tried before
/// giving up in first-available mode.
pub const FILE_ATTEMPTS: usize = 10;

/// Permission bits for created log directories.
pub const LOG_DIR_MODE: u32 = 0o755;

/// Permission bits for created log files (owner and group only).
pub const LOG_FILE_MODE: u32 = 0o660;

// =============================================================================
// Formatting
// =============================================================================

/// Timestamp layout for human-readable output (chrono syntax).
pub const TEXT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Timestamp layout for structured (JSON) output (chrono syntax).
pub const JSON_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

// =============================================================================
// Configuration
// =============================================================================

/// Config file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that switches on structured logs.
pub const STRUCTURED_LOGS_ENV: &str = "STRUCTURED_LOGS";

/// Directory name (under the platform data dir) holding default log files.
pub const LOG_DIR_NAME: &str = "logs";
