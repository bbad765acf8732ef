// Logsmith - core/mod.rs
//
// Core logic: the verbosity value type, file sink selection, per-module level
// storage, and the level registry.
// Must NOT depend on: app.

pub mod levels;
pub mod registry;
pub mod sink;
pub mod verbosity;
