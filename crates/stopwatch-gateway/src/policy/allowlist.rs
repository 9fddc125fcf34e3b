//! IP allowlist compilation and matching.
//!
//! Entries are kept compatible with a single comma-separated setting
//! (`"203.0.113.7, ::1"`): every configured string is split on commas and
//! trimmed. Items are a single address, a CIDR network, or `*`.

use std::net::IpAddr;

use ipnet::IpNet;
use stopwatch_core::error::{Result, StopwatchError};

/// Compiled allowlist rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpRule {
    Any,
    Single(IpAddr),
    Net(IpNet),
}

impl IpRule {
    pub fn matches(&self, ip: IpAddr) -> bool {
        match self {
            IpRule::Any => true,
            IpRule::Single(a) => *a == normalize(ip),
            IpRule::Net(n) => n.contains(&normalize(ip)),
        }
    }
}

pub fn compile_rules(raw: &[String]) -> Result<Vec<IpRule>> {
    let mut out = Vec::new();
    for entry in raw {
        for item in entry.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            out.push(parse_rule(item)?);
        }
    }
    Ok(out)
}

fn parse_rule(item: &str) -> Result<IpRule> {
    if item == "*" {
        return Ok(IpRule::Any);
    }
    if item.contains('/') {
        let net: IpNet = item.parse().map_err(|_| {
            StopwatchError::BadConfig(format!("invalid allowed_ips network: {item}"))
        })?;
        return Ok(IpRule::Net(net.trunc()));
    }
    let ip: IpAddr = item
        .parse()
        .map_err(|_| StopwatchError::BadConfig(format!("invalid allowed_ips address: {item}")))?;
    Ok(IpRule::Single(normalize(ip)))
}

pub fn is_ip_allowed(rules: &[IpRule], ip: IpAddr) -> bool {
    rules.iter().any(|r| r.matches(ip))
}

/// IPv4-mapped IPv6 (`::ffff:a.b.c.d`) compares as plain IPv4.
fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        v4 => v4,
    }
}
