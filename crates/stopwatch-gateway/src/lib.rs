//! stopwatch gateway library entry.
//!
//! Hosts the marker log inside an axum application: config, the IP
//! allowlist gate, the request-local run handle, and the timing middleware
//! that finalizes HTML bodies. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod services;
pub mod transport;

pub use context::RunHandle;
pub use router::{build_router, instrument};
