//! Per-request context shared between middleware and handlers.
//!
//! Holds caller resolution for the access gate and the request-local
//! [`RunHandle`]; nothing here outlives a single request.

pub mod caller;
pub mod run_handle;

pub use caller::resolve_caller;
pub use run_handle::RunHandle;
