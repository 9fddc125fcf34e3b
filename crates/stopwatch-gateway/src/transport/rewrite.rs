//! Response inspection helpers for the timing middleware.

use std::time::Duration;

use axum::body::HttpBody;
use axum::http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stopwatch_core::error::{ClientCode, StopwatchError};

pub const SERVER_TIMING: &str = "server-timing";

/// Only `text/html` bodies carry placeholder tokens.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Declared body length, if any.
pub fn declared_len(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Encoded (compressed) bodies cannot be searched for tokens.
pub fn is_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case("identity"))
}

/// True when the header or the body's size hint already puts it above `max`.
pub fn known_oversize(resp: &Response, max: usize) -> bool {
    let limit = u64::try_from(max).unwrap_or(u64::MAX);
    declared_len(resp.headers()).is_some_and(|n| n > max) || resp.body().size_hint().lower() > limit
}

/// `Server-Timing` value for the whole run, e.g. `total;dur=401.5`.
pub fn server_timing_value(total: Duration) -> String {
    format!("total;dur={:.1}", total.as_secs_f64() * 1000.0)
}

pub fn error_response(err: &StopwatchError) -> Response {
    let status = match err.client_code() {
        ClientCode::UpstreamBody => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({
        "code": err.client_code().as_str(),
        "msg": err.to_string(),
    });
    (status, axum::Json(body)).into_response()
}
