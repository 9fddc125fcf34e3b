//! Timing middleware: the request lifecycle around one [`Run`].
//!
//! Per request, exactly once:
//! - resolve the caller and ask the access gate
//! - start a run and expose it to handlers through a [`RunHandle`]
//! - after the inner service responds, end the run and rewrite HTML bodies
//!   (placeholder tokens, optional footer)
//! - append `Server-Timing` and record metrics

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::StreamExt;
use stopwatch_core::error::StopwatchError;
use stopwatch_core::placeholder::{self, SUMMARY_TOKEN};
use stopwatch_core::Run;

use crate::app_state::AppState;
use crate::context::{resolve_caller, RunHandle};

use super::rewrite::{error_response, is_encoded, is_html, known_oversize, server_timing_value, SERVER_TIMING};

pub async fn track_render(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let sw = &app.cfg().stopwatch;
    let caller = resolve_caller(req.headers(), req.extensions(), sw.trust_forwarded_for);
    let visible = app.gate().is_enabled_for(caller);
    let path = req.uri().path().to_string();
    let head = req.method() == Method::HEAD;

    let run = RunHandle::active(Run::start(app.clock()).with_label(sw.label.clone()));
    // Rejected callers get a disabled handle: handler markers are skipped.
    let exposed = if visible { run.clone() } else { RunHandle::disabled() };
    req.extensions_mut().insert(exposed);

    let response = next.run(req).await;

    let gate = if visible { "visible" } else { "hidden" };
    app.metrics().requests.inc(&[("gate", gate)]);

    let max = app.cfg().server.max_body_bytes;
    let mut response = if head || !is_html(response.headers()) || is_encoded(response.headers()) {
        app.metrics().rewrites.inc(&[("outcome", "passthrough")]);
        end_run(&run);
        response
    } else if known_oversize(&response, max) {
        tracing::warn!(%path, limit = max, "html body above rewrite limit; passing through");
        app.metrics().rewrites.inc(&[("outcome", "too_large")]);
        end_run(&run);
        response
    } else {
        let (mut parts, body) = response.into_parts();
        match buffer_body(body, max).await {
            Ok(Buffered::Complete(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => {
                    let out = finalize(&run, &text, visible, sw.inject_footer);
                    parts.headers.remove(CONTENT_LENGTH);
                    app.metrics().rewrites.inc(&[("outcome", "rewritten")]);
                    Response::from_parts(parts, Body::from(out))
                }
                Err(e) => {
                    tracing::debug!(%path, "html body is not utf-8; passing through");
                    app.metrics().rewrites.inc(&[("outcome", "passthrough")]);
                    end_run(&run);
                    Response::from_parts(parts, Body::from(e.into_bytes()))
                }
            },
            Ok(Buffered::Overrun(body)) => {
                tracing::warn!(%path, limit = max, "streamed html body above rewrite limit; passing through");
                app.metrics().rewrites.inc(&[("outcome", "too_large")]);
                end_run(&run);
                Response::from_parts(parts, body)
            }
            Err(e) => {
                tracing::warn!(%path, error = %e, "failed to read html body");
                app.metrics().rewrites.inc(&[("outcome", "failed")]);
                end_run(&run);
                return error_response(&StopwatchError::UpstreamBody(e.to_string()));
            }
        }
    };

    let (total, markers) = run
        .with_run(|r| (r.total_elapsed(), r.markers().len()))
        .unwrap_or_default();

    app.metrics().render_duration.observe(&[("gate", gate)], total);
    if visible {
        app.metrics().markers.add(&[], markers as u64);
        if sw.server_timing {
            if let Ok(v) = HeaderValue::from_str(&server_timing_value(total)) {
                response.headers_mut().append(SERVER_TIMING, v);
            }
        }
    }

    tracing::debug!(
        %path,
        visible,
        markers,
        total_ms = total.as_secs_f64() * 1000.0,
        "render timed"
    );
    response
}

enum Buffered {
    Complete(Vec<u8>),
    /// Limit crossed: the chunks read so far, followed by the unread stream.
    Overrun(Body),
}

/// Read `body` up to `limit` bytes without losing any of it on overrun.
async fn buffer_body(body: Body, limit: usize) -> Result<Buffered, axum::Error> {
    let mut stream = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut len = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        len = len.saturating_add(chunk.len());
        chunks.push(chunk);
        if len > limit {
            let read = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
            return Ok(Buffered::Overrun(Body::from_stream(read.chain(stream))));
        }
    }
    Ok(Buffered::Complete(chunks.concat()))
}

fn end_run(run: &RunHandle) {
    run.with_run(Run::end_run);
}

/// End the run and substitute tokens; a poisoned run blanks the tokens.
fn finalize(run: &RunHandle, text: &str, visible: bool, inject_footer: bool) -> String {
    run.with_run(|r| {
        r.end_run();
        let out = r.finalize_output(text, visible);
        if visible && inject_footer && !text.contains(SUMMARY_TOKEN) {
            if let Some(with_footer) = placeholder::inject_footer(&out, &r.render_summary()) {
                return with_footer;
            }
        }
        out
    })
    .unwrap_or_else(|| placeholder::substitute(text, "", ""))
}
