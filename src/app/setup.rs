// Logsmith - app/setup.rs
//
// Initialisation entry points. Builds a `tracing` dispatcher from
// `LoggingOptions`:
//   1. console layer on stderr, gated by its own LevelTable
//   2. optional file layer over a FileSink, gated by a second LevelTable
// then binds the console table into the caller's LevelRegistry so levels can
// be inspected and changed at runtime.
//
// The process-wide dispatcher is installed once, with its layer set behind a
// reload handle. Later initialisations swap their layers into it (for example
// to add file logging on top of console logging) and rebind the registry.
//
// Nothing here terminates the process; callers decide what is fatal.

use crate::app::options::{AsLoggingOptions, LoggingOptions};
use crate::core::levels::{LevelBackend, LevelTable, ModuleFilter};
use crate::core::registry::LevelRegistry;
use crate::core::sink::{FileSink, SinkPolicy};
use crate::core::verbosity::Verbosity;
use crate::util::error::{LoggingError, Result};
use crate::util::logging::{should_colour, ClockTime, JsonFormat};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;
type LayerSet = Vec<BoxedLayer>;
type LayerHandle = reload::Handle<LayerSet, Registry>;

/// Layer handle of the global dispatcher, once this crate has installed one.
static GLOBAL_LAYERS: Mutex<Option<LayerHandle>> = Mutex::new(None);

/// A built but not yet installed logging configuration.
pub struct LoggingSetup {
    dispatch: Dispatch,
    layers: LayerHandle,
    console_levels: Arc<LevelTable>,
    file_levels: Option<Arc<LevelTable>>,
    sink: Option<FileSink>,
}

impl LoggingSetup {
    /// Build the dispatcher described by `options`, acquiring the log file
    /// if one is configured.
    pub fn build(options: &LoggingOptions) -> Result<Self> {
        let console_levels = Arc::new(LevelTable::with_root(options.verbosity));
        for (module, level) in &options.module_levels {
            console_levels.set_level(*level, module);
        }

        let ansi = should_colour(options.colour, std::io::stderr().is_terminal());
        let mut layers: LayerSet = vec![format_layer(
            std::io::stderr,
            options.structured,
            ansi,
            ModuleFilter::new(Arc::clone(&console_levels)),
        )];

        let mut sink = None;
        let mut file_levels = None;
        if let Some(path) = &options.file {
            let acquired = FileSink::acquire(path, options.sink_policy)?;
            let levels = Arc::new(LevelTable::with_root(options.file_verbosity));
            layers.push(format_layer(
                acquired.writer(),
                options.structured,
                false,
                ModuleFilter::new(Arc::clone(&levels)),
            ));
            sink = Some(acquired);
            file_levels = Some(levels);
        }

        let (layer, handle) = reload::Layer::new(layers);
        let subscriber = Registry::default().with(layer);
        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            layers: handle,
            console_levels,
            file_levels,
            sink,
        })
    }

    /// The dispatcher, for scoped use with `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Levels applied to console output.
    pub fn console_levels(&self) -> &Arc<LevelTable> {
        &self.console_levels
    }

    /// Levels applied to file output, if a file is configured.
    pub fn file_levels(&self) -> Option<&Arc<LevelTable>> {
        self.file_levels.as_ref()
    }

    pub fn sink(&self) -> Option<&FileSink> {
        self.sink.as_ref()
    }

    /// Bind the console levels into `registry` without installing the
    /// dispatcher globally. Replaces any previously bound backend.
    pub fn bind(&self, registry: &LevelRegistry) {
        registry.bind(self.console_levels.clone());
    }

    /// Make this configuration the process-wide one and bind `registry`.
    ///
    /// The first call installs the global dispatcher. Later calls replace its
    /// layers with this setup's; a file opened by an earlier setup stays
    /// open until its own handle closes it. Fails if some other global
    /// dispatcher was installed first, in which case the registry is left
    /// untouched and the acquired file is closed.
    pub fn install(self, registry: &Arc<LevelRegistry>) -> Result<LoggingHandle> {
        let installed = {
            let mut global = GLOBAL_LAYERS.lock().unwrap_or_else(PoisonError::into_inner);
            match global.as_ref().cloned() {
                Some(active) => self.swap_into(&active),
                None => match tracing::dispatcher::set_global_default(self.dispatch.clone()) {
                    Ok(()) => {
                        *global = Some(self.layers.clone());
                        Ok(())
                    }
                    Err(source) => Err(LoggingError::Install { source }),
                },
            }
        };

        if let Err(e) = installed {
            if let Some(sink) = &self.sink {
                if let Err(close_err) = sink.close() {
                    tracing::warn!(
                        path = %sink.path().display(),
                        error = %close_err,
                        "Failed to close log file after install failure"
                    );
                }
            }
            return Err(e);
        }
        self.bind(registry);

        tracing::info!(
            file = ?self.sink.as_ref().map(FileSink::path),
            "Logging initialised"
        );

        Ok(LoggingHandle {
            registry: Arc::clone(registry),
            sink: self.sink,
        })
    }

    /// Move this setup's layers into the installed dispatcher.
    fn swap_into(&self, active: &LayerHandle) -> Result<()> {
        let mut layers = LayerSet::new();
        self.layers
            .modify(|own| layers = std::mem::take(own))
            .map_err(|source| LoggingError::Reload { source })?;
        active
            .reload(layers)
            .map_err(|source| LoggingError::Reload { source })
    }
}

/// Handle returned by a successful global install.
#[derive(Debug)]
pub struct LoggingHandle {
    registry: Arc<LevelRegistry>,
    sink: Option<FileSink>,
}

impl LoggingHandle {
    /// The registry the console levels were bound into.
    pub fn registry(&self) -> &Arc<LevelRegistry> {
        &self.registry
    }

    pub fn sink(&self) -> Option<&FileSink> {
        self.sink.as_ref()
    }

    /// Close any open log file. Safe to call repeatedly, and a no-op when
    /// logging never had a file.
    pub fn close_file_logging(&self) -> std::io::Result<()> {
        match &self.sink {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}

fn format_layer<W>(writer: W, structured: bool, ansi: bool, filter: ModuleFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if structured {
        let inner = fmt::layer::<Registry>()
            .event_format(JsonFormat)
            .with_writer(writer)
            .with_ansi(false);
        filter.layer(inner).boxed()
    } else {
        let inner = fmt::layer::<Registry>()
            .with_timer(ClockTime)
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(writer);
        filter.layer(inner).boxed()
    }
}

/// Initialise logging from an options struct.
pub fn init_logging_options(
    options: &LoggingOptions,
    registry: &Arc<LevelRegistry>,
) -> Result<LoggingHandle> {
    LoggingSetup::build(options)?.install(registry)
}

/// Initialise logging from anything that can describe its options.
pub fn init_logging_options_like<T: AsLoggingOptions + ?Sized>(
    options: &T,
    registry: &Arc<LevelRegistry>,
) -> Result<LoggingHandle> {
    init_logging_options(&options.logging_options(), registry)
}

/// Console-only logging at `verbosity`.
pub fn init_logging(verbosity: Verbosity, registry: &Arc<LevelRegistry>) -> Result<LoggingHandle> {
    init_logging_options(
        &LoggingOptions {
            verbosity,
            ..LoggingOptions::default()
        },
        registry,
    )
}

/// Console logging plus a fresh log file at `path`.
pub fn init_file_logging(
    stderr_verbosity: Verbosity,
    file_verbosity: Verbosity,
    path: &Path,
    registry: &Arc<LevelRegistry>,
) -> Result<LoggingHandle> {
    init_structured_logging(stderr_verbosity, file_verbosity, path, false, registry)
}

/// Like [`init_file_logging`] but optionally emitting JSON.
pub fn init_structured_logging(
    stderr_verbosity: Verbosity,
    file_verbosity: Verbosity,
    path: &Path,
    structured: bool,
    registry: &Arc<LevelRegistry>,
) -> Result<LoggingHandle> {
    init_logging_options(
        &LoggingOptions {
            verbosity: stderr_verbosity,
            file: Some(path.to_path_buf()),
            file_verbosity,
            sink_policy: SinkPolicy::FirstAvailable,
            structured,
            ..LoggingOptions::default()
        },
        registry,
    )
}
