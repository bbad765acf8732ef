// Logsmith - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation. Invalid values produce warnings and fall back to defaults;
// a missing file is not an error.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::app::options::LoggingOptions;
use crate::core::sink::SinkPolicy;
use crate::core::verbosity::Verbosity;
use crate::util::constants;
use crate::util::error::ConfigError;
use crate::util::logging::ColourMode;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Resolved platform paths for configuration and log files.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/<app>/)
    pub config_dir: PathBuf,

    /// Default directory for log files (e.g. ~/.local/share/<app>/logs/)
    pub log_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths for `app_id`.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve(app_id: &str) -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", app_id) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let log_dir = proj_dirs.data_dir().join(constants::LOG_DIR_NAME);

            tracing::debug!(
                config = %config_dir.display(),
                logs = %log_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                log_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                log_dir: fallback.join(constants::LOG_DIR_NAME),
                config_dir: fallback,
            }
        }
    }

    /// Full path of the config file inside `config_dir`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[modules]` table: module name -> level string.
    pub modules: BTreeMap<String, String>,
}

/// `[logging]` config section.
///
/// Levels are kept as strings here so a bad value becomes a warning rather
/// than rejecting the whole file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Console level (name, 0-4, or v/vv/vvv).
    pub verbosity: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
    /// File level.
    pub file_verbosity: Option<String>,
    /// Append to the exact file instead of choosing a fresh one.
    pub append: Option<bool>,
    /// "auto", "always" or "never".
    pub colour: Option<String>,
    /// JSON output.
    pub structured: Option<bool>,
}

/// Parse config text. Returns options plus non-fatal warnings.
pub fn parse_config(
    content: &str,
    origin: &Path,
) -> Result<(LoggingOptions, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut warnings: Vec<String> = Vec::new();
    let mut options = LoggingOptions::default();

    // -- Logging: verbosity --
    if let Some(ref value) = raw.logging.verbosity {
        match value.parse::<Verbosity>() {
            Ok(level) => options.verbosity = level,
            Err(e) => warnings.push(format!(
                "[logging] verbosity: {e}. Using default ({}).",
                constants::DEFAULT_VERBOSITY
            )),
        }
    }

    // -- Logging: file_verbosity --
    if let Some(ref value) = raw.logging.file_verbosity {
        match value.parse::<Verbosity>() {
            Ok(level) => options.file_verbosity = level,
            Err(e) => warnings.push(format!(
                "[logging] file_verbosity: {e}. Using default ({}).",
                constants::DEFAULT_FILE_VERBOSITY
            )),
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            options.file = Some(PathBuf::from(file));
        }
    }

    if raw.logging.append == Some(true) {
        options.sink_policy = SinkPolicy::Append;
    }

    // -- Logging: colour --
    if let Some(ref colour) = raw.logging.colour {
        match colour.parse::<ColourMode>() {
            Ok(mode) => options.colour = mode,
            Err(e) => warnings.push(format!("[logging] colour: {e}. Using default (auto).")),
        }
    }

    if let Some(structured) = raw.logging.structured {
        options.structured = structured;
    }

    // -- Modules --
    for (module, value) in &raw.modules {
        match value.parse::<Verbosity>() {
            Ok(level) => {
                options.module_levels.insert(module.clone(), level);
            }
            Err(e) => warnings.push(format!("[modules] {module}: {e}. Ignoring.")),
        }
    }

    Ok((options, warnings))
}

/// Load and validate a config file.
///
/// A missing file yields defaults with no warnings (first run). An
/// unreadable or unparseable file yields defaults plus a warning explaining
/// why, so the process still starts with usable logging.
pub fn load_config(path: &Path) -> (LoggingOptions, Vec<String>) {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found; using defaults");
        return (LoggingOptions::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(source) => {
            let e = ConfigError::Io {
                path: path.to_path_buf(),
                source,
            };
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            return (LoggingOptions::default(), vec![msg]);
        }
    };

    match parse_config(&content, path) {
        Ok((options, warnings)) => {
            tracing::info!(path = %path.display(), "Loaded config file");
            if !warnings.is_empty() {
                tracing::warn!(
                    count = warnings.len(),
                    "Config validation produced warnings"
                );
            }
            (options, warnings)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (LoggingOptions::default(), vec![msg])
        }
    }
}
