//! Lightweight in-process metrics, exposed as Prometheus text on `/metrics`.

pub mod metrics;

pub use metrics::GatewayMetrics;
