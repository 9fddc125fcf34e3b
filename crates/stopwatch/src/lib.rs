//! Top-level facade crate for stopwatch.
//!
//! Re-exports the marker log and the gateway library so users can depend on a single crate.

pub mod core {
    pub use stopwatch_core::*;
}

pub mod gateway {
    pub use stopwatch_gateway::*;
}
