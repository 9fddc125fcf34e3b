use serde::Deserialize;
use stopwatch_core::error::{Result, StopwatchError};
use stopwatch_core::DEFAULT_LABEL;

use crate::policy::allowlist::compile_rules;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub stopwatch: StopwatchSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StopwatchError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.stopwatch.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound for buffering an HTML body to rewrite it.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(StopwatchError::BadConfig(
                "server.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopwatchSection {
    #[serde(default = "default_label")]
    pub label: String,

    /// Callers allowed to see timing output. Each entry may itself be a
    /// comma-separated list; items are IPs, CIDR networks, or `*`.
    #[serde(default)]
    pub allowed_ips: Vec<String>,

    /// Take the caller address from `X-Forwarded-For` (first hop).
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Insert a summary footer before `</body>` on pages without the summary token.
    #[serde(default)]
    pub inject_footer: bool,

    /// Emit a `Server-Timing` header for allowed callers.
    #[serde(default = "default_true")]
    pub server_timing: bool,
}

impl Default for StopwatchSection {
    fn default() -> Self {
        Self {
            label: default_label(),
            allowed_ips: Vec::new(),
            trust_forwarded_for: false,
            inject_footer: false,
            server_timing: true,
        }
    }
}

impl StopwatchSection {
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(StopwatchError::BadConfig("stopwatch.label must not be empty".into()));
        }
        compile_rules(&self.allowed_ips)?;
        Ok(())
    }
}

fn default_label() -> String {
    DEFAULT_LABEL.into()
}
fn default_true() -> bool {
    true
}
