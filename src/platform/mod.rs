// Logsmith - platform/mod.rs
//
// Platform abstraction layer: filesystem locking primitives and config
// file / directory resolution.
// Dependencies: standard library, fs2, directories, toml.

pub mod config;
pub mod fs;
