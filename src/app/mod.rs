// Logsmith - app/mod.rs
//
// Application layer: logging options and the initialisation entry points
// that wire sinks, formatters and level tables into `tracing`.

pub mod options;
pub mod setup;
