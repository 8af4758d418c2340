//! Rate limiting for high-frequency input.
//!
//! ## Usage
//!
//! Gate scroll events so the visible window is recomputed at most once per
//! frame.
use web_time::{Duration, Instant};

/// Interval targeting one update per animation frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Leading-edge throttle.
///
/// The first call of a burst passes immediately. Calls arriving before the
/// interval has elapsed are dropped, and the first call at or after the end of
/// the interval passes and starts a new one.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl Throttle {
    /// Creates a throttle with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Passes `value` through if the throttle is open at `now`.
    pub fn invoke_at<T>(&mut self, value: T, now: Instant) -> Option<T> {
        let open = match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if !open {
            return None;
        }
        self.last_fired = Some(now);
        Some(value)
    }

    /// Passes `value` through if the throttle is open now.
    pub fn invoke<T>(&mut self, value: T) -> Option<T> {
        self.invoke_at(value, Instant::now())
    }

    /// Reopens the throttle so the next call passes immediately.
    pub fn cancel(&mut self) {
        self.last_fired = None;
    }
}
