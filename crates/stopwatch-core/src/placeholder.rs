//! Placeholder tokens embedded in page content.
//!
//! Authored pages place these literal tokens where the summary and the
//! report table should appear. They are substituted verbatim; a page missing
//! either token is left alone for that token.

/// Replaced with the compact summary (`Page Render Time : 0.12 seconds`).
pub const SUMMARY_TOKEN: &str = "{{summary}}";

/// Replaced with the full marker table.
pub const REPORT_TOKEN: &str = "{{report}}";

/// Replace every occurrence of both tokens in one left-to-right pass.
///
/// Only tokens present in `body` are replaced; inserted text is never
/// scanned again.
pub fn substitute(body: &str, summary: &str, report: &str) -> String {
    let mut out = String::with_capacity(body.len() + summary.len() + report.len());
    let mut rest = body;
    while let Some(at) = rest.find("{{") {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        if let Some(after) = tail.strip_prefix(SUMMARY_TOKEN) {
            out.push_str(summary);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(REPORT_TOKEN) {
            out.push_str(report);
            rest = after;
        } else {
            // `{{{summary}}` still holds a token one byte further on.
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Insert `<div id="stopwatch">{summary}</div>` before the first `</body>`.
///
/// Returns `None` when the body has no closing body tag.
pub fn inject_footer(body: &str, summary: &str) -> Option<String> {
    let at = body.find("</body>")?;
    let mut out = String::with_capacity(body.len() + summary.len() + 32);
    out.push_str(&body[..at]);
    out.push_str("<div id=\"stopwatch\">");
    out.push_str(summary);
    out.push_str("</div>");
    out.push_str(&body[at..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tokens() {
        assert_eq!(
            substitute("<body>{{summary}}{{report}}</body>", "S", "R"),
            "<body>SR</body>"
        );
    }

    #[test]
    fn missing_tokens_are_noop() {
        assert_eq!(substitute("<body>{{report}}</body>", "S", "R"), "<body>R</body>");
        assert_eq!(substitute("<body>{{summary}}</body>", "S", "R"), "<body>S</body>");
        assert_eq!(substitute("<body></body>", "S", "R"), "<body></body>");
    }

    #[test]
    fn repeated_tokens_all_replaced() {
        assert_eq!(substitute("{{summary}}|{{summary}}", "S", ""), "S|S");
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        assert_eq!(
            substitute("{{summary}}|{{report}}", "{{report}}", "R"),
            "{{report}}|R"
        );
        assert_eq!(substitute("<p>{{report}}</p>", "S", "{{summary}}"), "<p>{{summary}}</p>");
    }

    #[test]
    fn stray_braces_are_kept() {
        assert_eq!(substitute("{{{summary}}}", "S", "R"), "{S}");
        assert_eq!(substitute("{{other}} {{", "S", "R"), "{{other}} {{");
        assert_eq!(substitute("{{summary", "S", "R"), "{{summary");
    }

    #[test]
    fn footer_goes_before_body_close() {
        let out = inject_footer("<html><body><p>x</p></body></html>", "T : 0.10 seconds");
        assert_eq!(
            out.as_deref(),
            Some("<html><body><p>x</p><div id=\"stopwatch\">T : 0.10 seconds</div></body></html>")
        );
    }

    #[test]
    fn footer_needs_body_close() {
        assert!(inject_footer("<p>fragment</p>", "T").is_none());
    }
}
