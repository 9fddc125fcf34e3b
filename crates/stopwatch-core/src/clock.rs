//! Time sources for the marker log.
//!
//! Elapsed arithmetic always uses the monotonic part of a [`Stamp`]; the wall
//! part is only rendered for display, so clock adjustments mid-request cannot
//! produce negative or skewed deltas.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::error::{Result, StopwatchError};

/// One clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Offset from the clock's origin (monotonic).
    pub mono: Duration,
    /// Wall-clock time at the same instant (display only).
    pub wall: SystemTime,
}

impl Stamp {
    /// Monotonic time elapsed since `earlier` (zero if `earlier` is later).
    pub fn since(&self, earlier: &Stamp) -> Duration {
        self.mono.saturating_sub(earlier.mono)
    }

    /// Wall-clock seconds since the UNIX epoch, fractional.
    pub fn unix_secs(&self) -> f64 {
        self.wall
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Stamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Stamp {
        (**self).now()
    }
}

/// Host clock: `Instant` for arithmetic, `SystemTime` for display.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Fails when the wall clock reads before the UNIX epoch; the log cannot
    /// display timestamps meaningfully in that case.
    pub fn new() -> Result<Self> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StopwatchError::Clock(format!("wall clock before unix epoch: {e}")))?;
        Ok(Self {
            origin: Instant::now(),
        })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Stamp {
        Stamp {
            mono: self.origin.elapsed(),
            wall: SystemTime::now(),
        }
    }
}

/// Manually driven clock for deterministic timing.
///
/// Time only moves when [`ManualClock::advance`] or [`ManualClock::set`] is
/// called. Cloned handles share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
    wall_origin: SystemTime,
}

impl ManualClock {
    /// Clock at offset zero, whose wall time starts at `wall_origin`.
    pub fn new(wall_origin: SystemTime) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(0)),
            wall_origin,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_nanos(by), Ordering::SeqCst);
    }

    /// Jump to an absolute offset from the origin.
    pub fn set(&self, at: Duration) {
        self.nanos.store(duration_nanos(at), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Stamp {
        let mono = Duration::from_nanos(self.nanos.load(Ordering::SeqCst));
        Stamp {
            mono,
            wall: self.wall_origin + mono,
        }
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::default();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);

        clock.advance(Duration::from_millis(250));
        let c = clock.now();
        assert_eq!(c.since(&a), Duration::from_millis(250));
        assert_eq!(c.unix_secs(), 0.25);
    }

    #[test]
    fn manual_clock_handles_share_reading() {
        let clock = ManualClock::default();
        let other = clock.clone();
        clock.set(Duration::from_secs(3));
        assert_eq!(other.now().mono, Duration::from_secs(3));
    }

    #[test]
    fn since_saturates_instead_of_going_negative() {
        let clock = ManualClock::default();
        clock.set(Duration::from_secs(2));
        let later = clock.now();
        clock.set(Duration::from_secs(1));
        let earlier = clock.now();
        assert_eq!(earlier.since(&later), Duration::ZERO);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new().expect("host clock");
        let a = clock.now();
        let b = clock.now();
        assert!(b.mono >= a.mono);
        assert!(b.unix_secs() > 0.0);
    }
}
