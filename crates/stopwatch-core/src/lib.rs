//! stopwatch core: the elapsed-time marker log, its HTML rendering, and the
//! placeholder contract used to splice timing output into page bodies.
//!
//! This crate carries no transport or runtime dependencies. A host (see
//! `stopwatch-gateway`) owns one [`Run`] per request, records markers while
//! producing the response, then calls [`Run::finalize_output`] on the body.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod placeholder;
pub mod render;
pub mod run;

pub use clock::{Clock, ManualClock, Stamp, SystemClock};
pub use error::{Result, StopwatchError};
pub use placeholder::{REPORT_TOKEN, SUMMARY_TOKEN};
pub use run::{Marker, Run, DEFAULT_LABEL};

/// Call-site label in the form `line N in module::path (file.rs)`.
#[macro_export]
macro_rules! here {
    () => {
        format!("line {} in {} ({})", line!(), module_path!(), file!())
    };
}

/// Record a marker labelled with the current call site.
///
/// Works with anything exposing
/// `record_marker(impl Into<String>, Option<&str>)`, i.e. [`Run`] and the
/// gateway's request handle.
///
/// ```ignore
/// marker!(run);
/// marker!(run, "after template load");
/// ```
#[macro_export]
macro_rules! marker {
    ($run:expr) => {
        $run.record_marker($crate::here!(), None)
    };
    ($run:expr, $note:expr) => {
        $run.record_marker($crate::here!(), Some($note))
    };
}
