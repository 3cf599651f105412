//! Timing for the main loop: a frame gate for the simulation tick and an
//! independent metronome for the once-per-second session clock.

use std::time::{Duration, Instant};

/// Lets a frame through once more than one interval has elapsed since the last
/// one. The leftover time carries over so slow frames are skipped, not replayed.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: Duration,
    then: Instant,
}

impl FrameGate {
    pub fn new(rate_hz: f64, now: Instant) -> Self {
        Self {
            interval: Duration::from_nanos((1e9 / rate_hz.max(1.0)).round() as u64),
            then: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when a frame is due at `now`. At most one frame per call, however late.
    pub fn ready(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.then);
        if elapsed <= self.interval {
            return false;
        }
        let carry = elapsed.as_nanos() % self.interval.as_nanos().max(1);
        let carry = Duration::from_nanos(u64::try_from(carry).unwrap_or(0));
        self.then = now.checked_sub(carry).unwrap_or(now);
        true
    }

    /// Time left before the next frame is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        (self.then + self.interval).saturating_duration_since(now)
    }

    /// Forget time spent away (pause, title screen) so it is not counted.
    pub fn reset(&mut self, now: Instant) {
        self.then = now;
    }
}

/// Fixed-period timer that keeps ticking regardless of the frame rate.
#[derive(Debug, Clone)]
pub struct Metronome {
    period: Duration,
    next: Instant,
    /// Time that was left on the current beat when paused.
    paused: Option<Duration>,
}

impl Metronome {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
            paused: None,
        }
    }

    /// Number of beats that fell due up to `now` (zero while paused).
    pub fn beats(&mut self, now: Instant) -> u32 {
        if self.paused.is_some() {
            return 0;
        }
        let mut beats = 0;
        while now >= self.next {
            self.next += self.period;
            beats += 1;
        }
        beats
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused.is_none() {
            self.paused = Some(self.next.saturating_duration_since(now));
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(left) = self.paused.take() {
            self.next = now + left;
        }
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        match self.paused {
            Some(left) => left,
            None => self.next.saturating_duration_since(now),
        }
    }
}
