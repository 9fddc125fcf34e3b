//! Shared application state for the stopwatch gateway.
//!
//! Holds only immutable config, the compiled access gate, the clock, and
//! metrics. Per-request run state never lives here.

use std::sync::Arc;

use stopwatch_core::error::Result;
use stopwatch_core::{Clock, SystemClock};

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::policy::{AccessGate, IpAllowlistGate};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    gate: Arc<dyn AccessGate>,
    clock: Arc<dyn Clock>,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Build application state from config: allowlist gate + host clock.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let gate = IpAllowlistGate::new(&cfg.stopwatch.allowed_ips)?;
        if gate.rule_count() == 0 {
            tracing::warn!("stopwatch.allowed_ips is empty; timing output is hidden for every caller");
        }
        let clock = SystemClock::new()?;
        Ok(Self::with_parts(cfg, Arc::new(gate), Arc::new(clock)))
    }

    /// Assemble state from explicit parts (custom gate or clock).
    pub fn with_parts(cfg: GatewayConfig, gate: Arc<dyn AccessGate>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                gate,
                clock,
                metrics: GatewayMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn gate(&self) -> &dyn AccessGate {
        self.inner.gate.as_ref()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }
}
