//! HTML rendering of runs.
//!
//! Durations are stored raw and only rounded here (2 dp for elapsed values,
//! 4 dp for wall-clock timestamps).

use std::fmt::Write;
use std::time::Duration;

use crate::run::Marker;

const REPORT_HEADER: &str = "<table class=\"stopwatch-report\"><thead><tr>\
<th>#</th><th>Time</th><th>Since previous</th><th>Since start</th>\
<th>Location</th><th>Note</th></tr></thead><tbody>";

const REPORT_FOOTER: &str = "</tbody></table>";

/// Render the marker table. Empty input renders to an empty string.
pub fn report_table(markers: &[Marker]) -> String {
    if markers.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(REPORT_HEADER.len() + markers.len() * 128);
    out.push_str(REPORT_HEADER);
    for m in markers {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{:.4}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            m.sequence,
            m.sequence_time.unix_secs(),
            seconds(m.elapsed_since_previous),
            seconds(m.elapsed_since_start),
            escape_html(&m.source_location),
            escape_html(m.annotation.as_deref().unwrap_or("")),
        );
    }
    out.push_str(REPORT_FOOTER);
    out
}

/// `"<label> : <total> seconds"`.
pub fn summary(label: &str, total: Duration) -> String {
    format!("{} : {} seconds", escape_html(label), seconds(total))
}

/// Seconds rounded to 2 decimal places.
pub fn seconds(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64())
}

/// Escapes markup characters and `{`, so rendered text never forms a
/// placeholder token.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Stamp;
    use std::time::UNIX_EPOCH;

    fn marker(seq: usize, at_ms: u64, prev_ms: u64, start_ms: u64, loc: &str, note: Option<&str>) -> Marker {
        let mono = Duration::from_millis(at_ms);
        Marker {
            sequence: seq,
            sequence_time: Stamp {
                mono,
                wall: UNIX_EPOCH + Duration::from_secs(1_700_000_000) + mono,
            },
            elapsed_since_previous: Duration::from_millis(prev_ms),
            elapsed_since_start: Duration::from_millis(start_ms),
            source_location: loc.to_string(),
            annotation: note.map(str::to_string),
        }
    }

    #[test]
    fn empty_report_is_empty() {
        assert_eq!(report_table(&[]), "");
    }

    #[test]
    fn one_row_per_marker_in_order() {
        let markers = vec![
            marker(1, 100, 0, 0, "A", None),
            marker(2, 350, 250, 350, "B", Some("query")),
            marker(3, 356, 6, 356, "C", None),
        ];
        let html = report_table(&markers);

        assert!(html.starts_with("<table"));
        assert!(html.ends_with("</table>"));
        assert_eq!(html.matches("<tr><td>").count(), 3);

        let a = html.find("<td>A</td>").unwrap_or(usize::MAX);
        let b = html.find("<td>B</td>").unwrap_or(usize::MAX);
        let c = html.find("<td>C</td>").unwrap_or(usize::MAX);
        assert!(a < b && b < c);

        assert!(html.contains(
            "<tr><td>2</td><td>1700000000.3500</td><td>0.25</td><td>0.35</td><td>B</td><td>query</td></tr>"
        ));
        assert!(html.contains("<td>0.01</td><td>0.36</td><td>C</td><td></td>"));
    }

    #[test]
    fn labels_and_notes_are_escaped() {
        let markers = vec![marker(1, 0, 0, 0, "<script>", Some("a & \"b\""))];
        let html = report_table(&markers);
        assert!(html.contains("<td>&lt;script&gt;</td>"));
        assert!(html.contains("<td>a &amp; &quot;b&quot;</td>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn braces_cannot_form_tokens() {
        let markers = vec![marker(1, 0, 0, 0, "loc", Some("user typed {{summary}}"))];
        let html = report_table(&markers);
        assert!(html.contains("<td>user typed &#123;&#123;summary}}</td>"));
        assert!(!html.contains("{{"));
        assert_eq!(summary("{{report}}", Duration::ZERO), "&#123;&#123;report}} : 0.00 seconds");
    }

    #[test]
    fn summary_rounds_to_two_places() {
        assert_eq!(summary("Page Render Time", Duration::from_millis(504)), "Page Render Time : 0.50 seconds");
        assert_eq!(summary("T", Duration::from_millis(1999)), "T : 2.00 seconds");
        assert_eq!(summary("T", Duration::ZERO), "T : 0.00 seconds");
    }
}
