// RunShape - platform/mod.rs
//
// Platform abstraction layer: config directories, config.toml, file and
// stdin reading.
// Dependencies: standard library, directories crate, core (marker types).
// Must NOT depend on: app.

pub mod config;
pub mod fs;
