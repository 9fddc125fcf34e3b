//! Access policy (who sees timing output).
//!
//! Compiles the configured allowlist into lookup rules that the timing
//! middleware consults once per request.

pub mod allowlist;
pub mod gate;

pub use gate::{AccessGate, IpAllowlistGate, StaticGate};
