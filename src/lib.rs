// RunShape - lib.rs
//
// Library entry point, exposing the extraction engine and the run pipeline
// for the CLI binary, integration tests and programmatic use.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
