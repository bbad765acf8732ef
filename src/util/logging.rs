// Logsmith - util/logging.rs
//
// Formatter glue handed to the `tracing-subscriber` fmt layers:
//   - a chrono wall-clock timer for human-readable lines
//   - a one-object-per-line JSON event format for structured logs
//   - the colour decision for a given output stream
//
// Nothing here decides *whether* a record is emitted; that is the level
// backend's job (core/levels.rs).

use crate::util::constants;
use chrono::Local;
use serde::Serialize;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Whether terminal colour is used for an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColourMode {
    /// Colour only when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColourMode {
    /// Resolve the pair of `--colour` / `--nocolour` flags.
    /// Forcing colour on wins if both are set.
    pub fn from_flags(colour: bool, no_colour: bool) -> Self {
        if colour {
            ColourMode::Always
        } else if no_colour {
            ColourMode::Never
        } else {
            ColourMode::Auto
        }
    }
}

impl std::str::FromStr for ColourMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ColourMode::Auto),
            "always" | "on" | "true" => Ok(ColourMode::Always),
            "never" | "off" | "false" => Ok(ColourMode::Never),
            other => Err(format!(
                "\"{other}\" is not a colour mode. Expected auto, always or never"
            )),
        }
    }
}

/// Decide on colour for a stream that is (or is not) a terminal.
pub fn should_colour(mode: ColourMode, is_terminal: bool) -> bool {
    match mode {
        ColourMode::Always => true,
        ColourMode::Never => false,
        ColourMode::Auto => is_terminal,
    }
}

/// Local wall-clock time as `HH:MM:SS.mmm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(constants::TEXT_TIME_FORMAT))
    }
}

/// Lowercase level name used in structured output.
pub fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        _ => "trace",
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: String,
    func: &'a str,
    level: &'static str,
    module: &'a str,
    msg: String,
    time: String,
}

/// Collects the `message` field and renders any other fields as `key=value`
/// after it.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    extra: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.extra, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.extra, " {}={value:?}", field.name());
        }
    }
}

impl MessageVisitor {
    fn into_msg(self) -> String {
        if self.extra.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.extra.trim_start().to_string()
        } else {
            self.message + &self.extra
        }
    }
}

/// One JSON object per event with keys `file`, `func`, `level`, `module`,
/// `msg` and `time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = JsonEntry {
            file: format!(
                "{}:{}",
                meta.file().unwrap_or("???"),
                meta.line().unwrap_or(0)
            ),
            func: meta.module_path().unwrap_or(""),
            level: level_name(meta.level()),
            module: meta.target(),
            msg: visitor.into_msg(),
            time: Local::now().format(constants::JSON_TIME_FORMAT).to_string(),
        };

        let line = serde_json::to_string(&entry).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}
