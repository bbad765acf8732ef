// Logsmith - util/mod.rs
//
// Utility modules: error types, named constants, formatter glue.

pub mod constants;
pub mod error;
pub mod logging;
