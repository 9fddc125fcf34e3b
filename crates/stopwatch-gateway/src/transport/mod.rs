//! Response interception.
//!
//! Exposes the timing middleware that wraps every request in a run and
//! rewrites HTML bodies once the inner service has produced them.

pub mod rewrite;
pub mod timing;

pub use timing::track_render;
