// Logsmith - app/options.rs
//
// Logging options: the plain struct the initialisation code consumes, the
// clap flag group that produces it, and the narrow adapter trait callers
// implement for their own flag structs.

use crate::core::sink::SinkPolicy;
use crate::core::verbosity::Verbosity;
use crate::util::constants;
use crate::util::logging::ColourMode;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything needed to initialise logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Console (stderr) verbosity.
    pub verbosity: Verbosity,

    /// File to echo full logging output to. `None` = console only.
    pub file: Option<PathBuf>,

    /// Verbosity for the file output.
    pub file_verbosity: Verbosity,

    /// How the log file is chosen.
    pub sink_policy: SinkPolicy,

    /// Console colour policy. Files never get colour.
    pub colour: ColourMode,

    /// Emit one JSON object per record instead of text.
    pub structured: bool,

    /// Initial console levels for individual modules.
    pub module_levels: BTreeMap<String, Verbosity>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            verbosity: constants::DEFAULT_VERBOSITY,
            file: None,
            file_verbosity: constants::DEFAULT_FILE_VERBOSITY,
            sink_policy: SinkPolicy::FirstAvailable,
            colour: ColourMode::Auto,
            structured: false,
            module_levels: BTreeMap::new(),
        }
    }
}

/// Anything that can produce [`LoggingOptions`].
///
/// Implement this for an application's own flag struct (typically one that
/// `#[command(flatten)]`s [`LoggingArgs`]) to hand it straight to
/// [`crate::app::setup::init_logging_options_like`].
pub trait AsLoggingOptions {
    fn logging_options(&self) -> LoggingOptions;
}

impl AsLoggingOptions for LoggingOptions {
    fn logging_options(&self) -> LoggingOptions {
        self.clone()
    }
}

/// Logging command-line flags.
#[derive(clap::Args, Debug, Clone)]
pub struct LoggingArgs {
    /// Verbosity of output (error, warning, notice, info, debug).
    #[arg(short = 'v', long = "verbosity", default_value = "warning")]
    pub verbosity: Verbosity,

    /// File to echo full logging output to.
    #[arg(long = "file")]
    pub file: Option<PathBuf>,

    /// Log level for file output.
    #[arg(long = "file_verbosity", default_value = "debug")]
    pub file_verbosity: Verbosity,

    /// Append log to existing file instead of overwriting its content. If not
    /// set, a new file will be chosen if the existing one is already open.
    #[arg(long = "append")]
    pub append: bool,

    /// Forces coloured output.
    #[arg(long = "colour", conflicts_with = "no_colour")]
    pub colour: bool,

    /// Forces colourless output.
    #[arg(long = "nocolour")]
    pub no_colour: bool,

    /// Output logs in structured (JSON) format.
    #[arg(long = "structured_logs", env = constants::STRUCTURED_LOGS_ENV)]
    pub structured: bool,
}

impl AsLoggingOptions for LoggingArgs {
    fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            verbosity: self.verbosity,
            file: self.file.clone(),
            file_verbosity: self.file_verbosity,
            sink_policy: if self.append {
                SinkPolicy::Append
            } else {
                SinkPolicy::FirstAvailable
            },
            colour: ColourMode::from_flags(self.colour, self.no_colour),
            structured: self.structured,
            module_levels: BTreeMap::new(),
        }
    }
}
