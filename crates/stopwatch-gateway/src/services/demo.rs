use axum::response::{Html, IntoResponse};
use stopwatch_core::placeholder::{REPORT_TOKEN, SUMMARY_TOKEN};
use stopwatch_core::{here, marker};

use crate::context::RunHandle;

const SECTIONS: [&str; 3] = ["Overview", "Changelog", "Contact"];

/// HTML page with both placeholder tokens and a handful of markers.
pub async fn index(run: RunHandle) -> Html<String> {
    marker!(run, "request accepted");

    let mut page = String::with_capacity(2048);
    page.push_str("<!doctype html><html><head><title>stopwatch</title></head><body>");
    page.push_str("<header><h1>stopwatch demo</h1><p>");
    page.push_str(SUMMARY_TOKEN);
    page.push_str("</p></header>");
    run.record_marker(here!(), Some("header rendered"));

    for (i, title) in SECTIONS.iter().enumerate() {
        // Let other tasks run between sections, as a real template engine would.
        tokio::task::yield_now().await;
        page.push_str(&format!("<section id=\"s{}\"><h2>{}</h2></section>", i + 1, title));
        run.record_marker(here!(), Some(*title));
    }

    page.push_str("<footer>");
    page.push_str(REPORT_TOKEN);
    page.push_str("</footer></body></html>");
    marker!(run, "page assembled");

    Html(page)
}

/// Non-HTML response: passes through the middleware untouched.
pub async fn plain(run: RunHandle) -> impl IntoResponse {
    run.mark("plain");
    format!("tokens stay literal outside html: {SUMMARY_TOKEN} {REPORT_TOKEN}\n")
}
