//! Frame-cadence scheduling primitives.
//!
//! `FrameScheduler` coalesces repeated requests within one frame into a
//! single unit of work — a re-entrancy guard, not a lock; everything runs
//! on one thread. `Debounce` coalesces mutation bursts into one trailing
//! action after a quiet period, which is how saves stay off the
//! interaction path.

use std::time::{Duration, Instant};

/// Schedule-if-not-already-scheduled flag, reset when the frame runs.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    scheduled: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request work for the next frame. Returns `true` if this request
    /// newly scheduled the frame (the caller should arm the frame
    /// callback), `false` if one was already pending.
    pub fn schedule(&mut self) -> bool {
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Consume the pending request at frame time. Returns whether work
    /// was actually scheduled since the last frame.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.scheduled)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}

/// Trailing debounce: `fire` re-arms the timer, `poll` reports readiness
/// once the quiet period has elapsed since the last `fire`.
#[derive(Debug)]
pub struct Debounce {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record an event; pushes the deadline out by the quiet period.
    pub fn fire(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// If the quiet period has elapsed, clears the pending state and
    /// returns `true` exactly once per burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_coalesces_requests() {
        let mut s = FrameScheduler::new();
        assert!(s.schedule());
        assert!(!s.schedule());
        assert!(!s.schedule());
        assert!(s.take());
        assert!(!s.take());
        assert!(s.schedule());
    }

    #[test]
    fn debounce_fires_once_after_quiet_period() {
        let mut d = Debounce::new(Duration::from_secs(1));
        let t0 = Instant::now();
        d.fire(t0);
        assert!(!d.poll(t0 + Duration::from_millis(500)));
        // A second burst pushes the deadline out.
        d.fire(t0 + Duration::from_millis(800));
        assert!(!d.poll(t0 + Duration::from_millis(1500)));
        assert!(d.poll(t0 + Duration::from_millis(1900)));
        // Fires exactly once per burst.
        assert!(!d.poll(t0 + Duration::from_secs(10)));
    }
}
