// Logsmith - core/verbosity.rs
//
// The verbosity value type shared by flags, config, the level backend and the
// registry. Parsing accepts three spellings (names, 0-4, v/vv/vvv) and clamps
// out-of-range integers instead of failing.

use crate::util::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Logging verbosity, ordered from most restrictive to most permissive.
///
/// `Critical < Error < Warning < Notice < Info < Debug`, so a record is shown
/// when its level is `<=` the configured verbosity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub enum Verbosity {
    Critical,
    Error,
    #[default]
    Warning,
    Notice,
    Info,
    Debug,
}

impl Verbosity {
    /// Returns all variants, most restrictive first.
    pub fn all() -> &'static [Verbosity] {
        &[
            Verbosity::Critical,
            Verbosity::Error,
            Verbosity::Warning,
            Verbosity::Notice,
            Verbosity::Info,
            Verbosity::Debug,
        ]
    }

    /// Lowercase name, as accepted by the parser.
    pub fn name(&self) -> &'static str {
        match self {
            Verbosity::Critical => "critical",
            Verbosity::Error => "error",
            Verbosity::Warning => "warning",
            Verbosity::Notice => "notice",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        }
    }

    /// Map a flag-scale integer (`0` = error .. `4` = debug) onto a level.
    ///
    /// Values below zero clamp to `Critical` and values above four clamp to
    /// `Debug`; both emit a warning.
    pub fn from_flag_level(level: i64) -> Verbosity {
        match level {
            0 => Verbosity::Error,
            1 => Verbosity::Warning,
            2 => Verbosity::Notice,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            n if n < 0 => {
                tracing::warn!(
                    level = n,
                    "Invalid log level; minimum is 0. Displaying critical errors only."
                );
                Verbosity::Critical
            }
            n => {
                tracing::warn!(
                    level = n,
                    "Invalid log level; maximum is 4. Displaying all messages."
                );
                Verbosity::Debug
            }
        }
    }

    /// The `tracing` threshold this verbosity lets through.
    ///
    /// `tracing` has no critical or notice level, so critical shares ERROR
    /// with error, notice shares INFO with info, and debug opens TRACE too.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Critical | Verbosity::Error => LevelFilter::ERROR,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Notice | Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Verbosity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let level = match lowered.as_str() {
            "critical" | "fatal" => Verbosity::Critical,
            "0" | "error" => Verbosity::Error,
            "1" | "warning" | "warn" => Verbosity::Warning,
            "2" | "notice" | "v" => Verbosity::Notice,
            "3" | "info" | "vv" => Verbosity::Info,
            "4" | "debug" | "vvv" => Verbosity::Debug,
            other => {
                if let Ok(n) = other.parse::<i64>() {
                    Verbosity::from_flag_level(n)
                } else if !other.is_empty() && other.chars().all(|c| c == 'v') {
                    // `v` is notice (2), so a run of n `v`s sits at n + 1.
                    let count = i64::try_from(other.len()).unwrap_or(i64::MAX);
                    Verbosity::from_flag_level(count.saturating_add(1))
                } else {
                    return Err(ConfigError::InvalidVerbosity {
                        value: s.to_string(),
                    });
                }
            }
        };
        Ok(level)
    }
}

impl TryFrom<String> for Verbosity {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

impl From<Verbosity> for String {
    fn from(v: Verbosity) -> Self {
        v.name().to_string()
    }
}
