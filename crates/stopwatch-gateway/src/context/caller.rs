use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the caller address for the access gate.
///
/// Peer address comes from axum `ConnectInfo`. With `trust_forwarded_for`,
/// the first parseable hop of `X-Forwarded-For` takes precedence.
pub fn resolve_caller(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_for(headers) {
            return Some(ip);
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    raw.split(',').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::http::HeaderValue;

    fn ext_with_peer(addr: &str) -> Extensions {
        let mut ext = Extensions::new();
        ext.insert(ConnectInfo::<SocketAddr>(addr.parse().unwrap()));
        ext
    }

    fn headers_with_xff(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(X_FORWARDED_FOR, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn peer_address_by_default() {
        let ext = ext_with_peer("192.0.2.1:5555");
        let h = headers_with_xff("203.0.113.5");
        assert_eq!(resolve_caller(&h, &ext, false), Some("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn forwarded_for_first_hop_when_trusted() {
        let ext = ext_with_peer("10.0.0.1:80");
        let h = headers_with_xff(" 203.0.113.5 , 10.0.0.1");
        assert_eq!(resolve_caller(&h, &ext, true), Some("203.0.113.5".parse().unwrap()));
    }

    #[test]
    fn garbage_forwarded_for_falls_back_to_peer() {
        let ext = ext_with_peer("[::1]:80");
        let h = headers_with_xff("unknown");
        assert_eq!(resolve_caller(&h, &ext, true), Some("::1".parse().unwrap()));
    }

    #[test]
    fn no_connect_info_is_unknown() {
        assert_eq!(resolve_caller(&HeaderMap::new(), &Extensions::new(), true), None);
    }
}
