//! Built-in demo pages.
//!
//! They show how handlers record markers through the request-local
//! [`RunHandle`](crate::context::RunHandle) and where placeholder tokens go.

pub mod demo;
