// RunShape - app/mod.rs
//
// Application layer: orchestration of one extraction run.
// Dependencies: core layer, platform::fs.

pub mod pipeline;
