//! Wall-clock pacing for the exit tour.

use std::{
    thread,
    time::{Duration, Instant},
};

/// Source of elapsed time between intro steps.
pub(crate) trait Clock {
    /// Waits for roughly `duration` and reports how much time actually passed.
    fn pause(&mut self, duration: Duration) -> Duration;
}

/// Sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn pause(&mut self, duration: Duration) -> Duration {
        let started = Instant::now();
        thread::sleep(duration);
        started.elapsed()
    }
}

/// Returns requested pauses immediately and remembers them.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct ManualClock {
    pub(crate) pauses: Vec<Duration>,
}

#[cfg(test)]
impl Clock for ManualClock {
    fn pause(&mut self, duration: Duration) -> Duration {
        self.pauses.push(duration);
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_waits_at_least_the_requested_time() {
        let elapsed = SystemClock.pause(Duration::from_millis(5));
        assert!(elapsed >= Duration::from_millis(5));
    }
}
