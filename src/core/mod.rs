// RunShape - core/mod.rs
//
// Core extraction engine: pure functions from an HTML string to a typed
// result. No filesystem, network, or clock access.
// Must NOT depend on: app, platform.

pub mod envelope;
pub mod export;
pub mod locate;
pub mod markers;
pub mod model;
pub mod normalize;
pub mod prognosis;
pub mod requirements;
pub mod sequence;
pub mod staleness;
