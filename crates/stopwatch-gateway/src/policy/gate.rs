use std::net::IpAddr;

use stopwatch_core::error::Result;

use super::allowlist::{compile_rules, is_ip_allowed, IpRule};

/// Decides whether timing output is active for a caller.
pub trait AccessGate: Send + Sync {
    /// `caller` is `None` when the peer address is unknown.
    fn is_enabled_for(&self, caller: Option<IpAddr>) -> bool;
}

/// Gate backed by the configured IP allowlist.
/// Construct once at startup, then share via Arc.
#[derive(Debug, Clone)]
pub struct IpAllowlistGate {
    rules: Vec<IpRule>,
}

impl IpAllowlistGate {
    pub fn new(allowed_ips: &[String]) -> Result<Self> {
        Ok(Self {
            rules: compile_rules(allowed_ips)?,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl AccessGate for IpAllowlistGate {
    fn is_enabled_for(&self, caller: Option<IpAddr>) -> bool {
        // Unknown caller or empty list: strict deny.
        caller.is_some_and(|ip| is_ip_allowed(&self.rules, ip))
    }
}

/// Gate with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

impl AccessGate for StaticGate {
    fn is_enabled_for(&self, _caller: Option<IpAddr>) -> bool {
        self.0
    }
}
