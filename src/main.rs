// Logsmith - main.rs
//
// Demonstration front-end. Handles:
// 1. CLI argument parsing (logging flags + optional config file)
// 2. Logging initialisation
// 3. Applying per-module overrides through the level registry
// 4. Emitting one record per level and printing the live module levels
//
// Exits non-zero if logging cannot be initialised; the library never does.

use clap::Parser;
use logsmith::platform::config::{load_config, PlatformPaths};
use logsmith::util::constants;
use logsmith::{AsLoggingOptions, LevelRegistry, LoggingArgs, LoggingOptions, Verbosity};
use std::path::PathBuf;
use std::sync::Arc;

/// Logsmith - logging initialisation helper demo.
///
/// Initialises console (and optionally file) logging, emits a record at
/// every level and prints the resulting per-module levels as JSON.
#[derive(Parser, Debug)]
#[command(name = "logsmith", version, about)]
struct Cli {
    #[command(flatten)]
    logging: LoggingArgs,

    /// Read defaults from this config file instead of the platform one
    /// (CLI flags given explicitly win).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Per-module override, e.g. `--set app::net=debug`. Repeatable.
    #[arg(long = "set", value_parser = parse_module_level)]
    set: Vec<(String, Verbosity)>,
}

fn parse_module_level(s: &str) -> Result<(String, Verbosity), String> {
    let (module, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected MODULE=LEVEL, got '{s}'"))?;
    let level = level.parse::<Verbosity>().map_err(|e| e.to_string())?;
    Ok((module.trim().to_string(), level))
}

impl AsLoggingOptions for Cli {
    fn logging_options(&self) -> LoggingOptions {
        let from_flags = self.logging.logging_options();
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PlatformPaths::resolve(constants::APP_ID).config_file());

        // A missing file yields defaults, so the flags pass through unchanged.
        let (mut merged, warnings) = load_config(&path);
        for w in &warnings {
            eprintln!("warning: {w}");
        }
        if from_flags.verbosity != constants::DEFAULT_VERBOSITY {
            merged.verbosity = from_flags.verbosity;
        }
        if from_flags.file.is_some() {
            merged.file = from_flags.file;
        }
        if from_flags.file_verbosity != constants::DEFAULT_FILE_VERBOSITY {
            merged.file_verbosity = from_flags.file_verbosity;
        }
        if self.logging.append {
            merged.sink_policy = from_flags.sink_policy;
        }
        if self.logging.colour || self.logging.no_colour {
            merged.colour = from_flags.colour;
        }
        merged.structured |= from_flags.structured;
        merged
    }
}

fn main() {
    let cli = Cli::parse();
    let registry = Arc::new(LevelRegistry::new());

    let handle = match logsmith::init_logging_options_like(&cli, &registry) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: Failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };
    logsmith::register_module!(registry);

    for (module, level) in &cli.set {
        registry.register(module);
        if let Err(e) = registry.set_level(*level, module) {
            tracing::error!(error = %e, module = %module, "Failed to apply module level");
        }
    }

    tracing::info!(
        version = constants::APP_VERSION,
        default_log_dir = %PlatformPaths::resolve(constants::APP_ID).log_dir.display(),
        "{} starting",
        constants::APP_NAME
    );
    tracing::error!("error-level record");
    tracing::warn!("warning-level record");
    tracing::info!("info-level record");
    tracing::debug!("debug-level record");
    tracing::trace!("trace-level record");

    match registry.module_levels() {
        Ok(levels) => match serde_json::to_string_pretty(&levels) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialise module levels"),
        },
        Err(e) => tracing::error!(error = %e, "Failed to read module levels"),
    }

    if let Err(e) = handle.close_file_logging() {
        eprintln!("Error: Failed to close log file: {e}");
        std::process::exit(1);
    }
}
