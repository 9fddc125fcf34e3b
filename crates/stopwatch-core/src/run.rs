//! Elapsed-time marker log.
//!
//! A [`Run`] covers one request: it is started when the request enters the
//! host, collects [`Marker`]s while the response is produced, and is ended
//! right before the body is finalized. Runs are plain values; the host keeps
//! one per request and never shares it between requests.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, Stamp};
use crate::placeholder;
use crate::render;

/// Label used by [`Run::render_summary`] unless overridden.
pub const DEFAULT_LABEL: &str = "Page Render Time";

/// One recorded checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// 1-based position within the run.
    pub sequence: usize,
    pub sequence_time: Stamp,
    /// Zero for the first marker of a run.
    pub elapsed_since_previous: Duration,
    /// Zero for the first marker of a run.
    pub elapsed_since_start: Duration,
    pub source_location: String,
    pub annotation: Option<String>,
}

pub struct Run {
    clock: Arc<dyn Clock>,
    label: String,
    start_time: Stamp,
    end_time: Option<Stamp>,
    markers: Vec<Marker>,
}

impl Run {
    /// Create a run and start it immediately.
    pub fn start(clock: Arc<dyn Clock>) -> Self {
        let start_time = clock.now();
        Self {
            clock,
            label: DEFAULT_LABEL.to_string(),
            start_time,
            end_time: None,
            markers: Vec::new(),
        }
    }

    /// Replace the summary label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Reset the run: new start time, no end time, no markers.
    pub fn start_run(&mut self) {
        self.start_time = self.clock.now();
        self.end_time = None;
        self.markers.clear();
    }

    /// Append a checkpoint.
    ///
    /// The first marker after [`Run::start_run`] carries zero deltas; later
    /// markers are measured against the previous marker and the run start.
    pub fn record_marker(
        &mut self,
        source_location: impl Into<String>,
        annotation: Option<&str>,
    ) -> &Marker {
        let now = self.clock.now();
        let (elapsed_since_previous, elapsed_since_start) = match self.markers.last() {
            None => (Duration::ZERO, Duration::ZERO),
            Some(prev) => (now.since(&prev.sequence_time), now.since(&self.start_time)),
        };

        let marker = Marker {
            sequence: self.markers.len() + 1,
            sequence_time: now,
            elapsed_since_previous,
            elapsed_since_start,
            source_location: source_location.into(),
            annotation: annotation.map(str::to_string),
        };
        tracing::trace!(
            seq = marker.sequence,
            location = %marker.source_location,
            since_start_us = micros(marker.elapsed_since_start),
            "marker recorded"
        );

        self.markers.push(marker);
        &self.markers[self.markers.len() - 1]
    }

    pub fn end_run(&mut self) {
        self.end_time = Some(self.clock.now());
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_time(&self) -> Stamp {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Stamp> {
        self.end_time
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// `end_time - start_time`; reads the clock if the run has not ended yet.
    pub fn total_elapsed(&self) -> Duration {
        let end = self.end_time.unwrap_or_else(|| self.clock.now());
        end.since(&self.start_time)
    }

    /// HTML table of all markers, or an empty string when none were recorded.
    pub fn render_report(&self) -> String {
        render::report_table(&self.markers)
    }

    /// `"<label> : <seconds, 2 dp> seconds"`.
    pub fn render_summary(&self) -> String {
        render::summary(&self.label, self.total_elapsed())
    }

    /// Substitute both placeholder tokens in `body`.
    ///
    /// With `visible == false` the tokens are removed instead, so nothing of
    /// the run leaks to callers the access gate rejected.
    pub fn finalize_output(&self, body: &str, visible: bool) -> String {
        if !visible {
            return placeholder::substitute(body, "", "");
        }
        placeholder::substitute(body, &self.render_summary(), &self.render_report())
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("label", &self.label)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("markers", &self.markers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::placeholder::{REPORT_TOKEN, SUMMARY_TOKEN};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn run_with_clock() -> (Run, ManualClock) {
        let clock = ManualClock::default();
        let run = Run::start(Arc::new(clock.clone()));
        (run, clock)
    }

    #[test]
    fn first_marker_has_zero_deltas() {
        let (mut run, clock) = run_with_clock();
        clock.advance(ms(400));
        let m = run.record_marker("first", None);
        assert_eq!(m.sequence, 1);
        assert_eq!(m.elapsed_since_previous, Duration::ZERO);
        assert_eq!(m.elapsed_since_start, Duration::ZERO);
    }

    #[test]
    fn later_markers_measure_against_previous_and_start() {
        let (mut run, clock) = run_with_clock();
        clock.set(ms(100));
        run.record_marker("A", None);
        clock.set(ms(350));
        run.record_marker("B", Some("db"));
        clock.set(ms(600));
        run.record_marker("C", None);

        let m = run.markers();
        assert_eq!(m.len(), 3);
        assert_eq!(m[1].elapsed_since_previous, ms(250));
        assert_eq!(m[1].elapsed_since_start, ms(350));
        assert_eq!(m[1].annotation.as_deref(), Some("db"));
        assert_eq!(m[2].elapsed_since_previous, ms(250));
        assert_eq!(m[2].elapsed_since_start, ms(600));
        assert!(m.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    #[test]
    fn stopwatch_scenario() {
        let (mut run, clock) = run_with_clock();
        clock.set(ms(100));
        run.record_marker("A", None);
        clock.set(ms(350));
        run.record_marker("B", None);
        clock.set(ms(500));
        run.end_run();

        let m = run.markers();
        assert_eq!(m[0].elapsed_since_previous, Duration::ZERO);
        assert_eq!(m[0].elapsed_since_start, Duration::ZERO);
        assert_eq!(m[1].elapsed_since_previous, ms(250));
        // Measured from the run start, not from the zeroed first marker.
        assert_eq!(m[1].elapsed_since_start, ms(350));
        assert_eq!(run.render_summary(), "Page Render Time : 0.50 seconds");
    }

    #[test]
    fn start_run_resets_state() {
        let (mut run, clock) = run_with_clock();
        run.record_marker("A", None);
        clock.advance(ms(50));
        run.end_run();

        clock.advance(ms(1000));
        run.start_run();
        assert!(run.markers().is_empty());
        assert!(run.end_time().is_none());
        assert_eq!(run.start_time().mono, ms(1050));

        clock.advance(ms(20));
        let m = run.record_marker("B", None);
        assert_eq!(m.sequence, 1);
        assert_eq!(m.elapsed_since_start, Duration::ZERO);
    }

    #[test]
    fn summary_uses_clock_before_end() {
        let (run, clock) = run_with_clock();
        clock.advance(ms(1234));
        assert_eq!(run.render_summary(), "Page Render Time : 1.23 seconds");
    }

    #[test]
    fn custom_label() {
        let (mut run, clock) = run_with_clock();
        run = run.with_label("Render");
        clock.advance(ms(2000));
        run.end_run();
        assert_eq!(run.label(), "Render");
        assert_eq!(run.render_summary(), "Render : 2.00 seconds");
    }

    #[test]
    fn finalize_visible_substitutes_both_tokens() {
        let (mut run, clock) = run_with_clock();
        clock.advance(ms(10));
        run.record_marker("A", None);
        clock.advance(ms(490));
        run.end_run();

        let body = format!("<body>{SUMMARY_TOKEN}<hr>{REPORT_TOKEN}</body>");
        let out = run.finalize_output(&body, true);
        assert!(out.starts_with("<body>Page Render Time : 0.50 seconds<hr><table"));
        assert!(out.ends_with("</table></body>"));
        assert!(!out.contains(SUMMARY_TOKEN));
        assert!(!out.contains(REPORT_TOKEN));
    }

    #[test]
    fn finalize_hidden_blanks_tokens_even_with_markers() {
        let (mut run, _clock) = run_with_clock();
        run.record_marker("A", Some("secret"));
        run.end_run();

        let out = run.finalize_output("<body>{{summary}}{{report}}</body>", false);
        assert_eq!(out, "<body></body>");
    }

    #[test]
    fn finalize_hidden_without_markers() {
        let (mut run, _clock) = run_with_clock();
        run.end_run();
        let out = run.finalize_output("<body>{{summary}}{{report}}</body>", false);
        assert_eq!(out, "<body></body>");
    }

    #[test]
    fn finalize_is_idempotent() {
        let (mut run, clock) = run_with_clock();
        run.record_marker("A", None);
        clock.advance(ms(300));
        run.end_run();

        let once = run.finalize_output("<p>{{summary}}</p>{{report}}", true);
        let twice = run.finalize_output(&once, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn finalize_is_idempotent_with_token_text_in_markers() {
        let (mut run, clock) = run_with_clock();
        run.record_marker("form", Some("user typed {{summary}}"));
        clock.set(ms(500));
        run.end_run();

        let once = run.finalize_output("<body>{{report}}</body>", true);
        let twice = run.finalize_output(&once, true);
        assert_eq!(once, twice);
        assert!(!twice.contains("Page Render Time"));
    }

    #[test]
    fn label_with_token_text_is_not_expanded() {
        let (mut run, clock) = run_with_clock();
        run = run.with_label("{{report}}");
        run.record_marker("A", None);
        clock.set(ms(500));
        run.end_run();

        let out = run.finalize_output("<p>{{summary}}</p>", true);
        assert_eq!(out, "<p>&#123;&#123;report}} : 0.50 seconds</p>");
        assert!(!out.contains("<table"));
    }

    #[test]
    fn trace_micros_saturate() {
        assert_eq!(micros(ms(3)), 3_000);
        assert_eq!(micros(Duration::MAX), u64::MAX);
    }

    #[test]
    fn finalize_single_token_only() {
        let (mut run, clock) = run_with_clock();
        clock.advance(ms(70));
        run.end_run();

        let out = run.finalize_output("<div>{{summary}}</div>", true);
        assert_eq!(out, "<div>Page Render Time : 0.07 seconds</div>");

        let out = run.finalize_output("<div>{{report}}</div>", true);
        assert_eq!(out, "<div></div>");
    }
}
