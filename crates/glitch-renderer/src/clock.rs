// ABOUTME: Stopwatch clock feeding the shader time.
// ABOUTME: Takes explicit instants so callers and tests control time.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Clock {
    started: Option<Instant>,
    last_delta: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.last_delta = Some(now);
    }

    pub fn stop(&mut self) {
        self.started = None;
        self.last_delta = None;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Seconds since `start`, zero while stopped
    pub fn elapsed(&self, now: Instant) -> f32 {
        self.started
            .map(|started| now.saturating_duration_since(started).as_secs_f32())
            .unwrap_or(0.0)
    }

    /// Time since the previous `delta` call (or `start`)
    pub fn delta(&mut self, now: Instant) -> Duration {
        let Some(last) = self.last_delta else {
            return Duration::ZERO;
        };
        self.last_delta = Some(now);
        now.saturating_duration_since(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_from_start() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        assert_eq!(clock.elapsed(t0), 0.0);

        clock.start(t0);
        let elapsed = clock.elapsed(t0 + Duration::from_millis(1500));
        assert!((elapsed - 1.5).abs() < 1e-6);
    }

    #[test]
    fn delta_is_time_since_previous_call() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(t0);

        assert_eq!(clock.delta(t0 + Duration::from_millis(40)), Duration::from_millis(40));
        assert_eq!(clock.delta(t0 + Duration::from_millis(50)), Duration::from_millis(10));
    }

    #[test]
    fn stopped_clock_reports_nothing() {
        let t0 = Instant::now();
        let mut clock = Clock::new();
        clock.start(t0);
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(clock.delta(t0 + Duration::from_secs(1)), Duration::ZERO);
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(1)), 0.0);
    }
}
