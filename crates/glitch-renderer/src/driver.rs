// ABOUTME: Frame pacing for the overlay, polled from the event loop.
// ABOUTME: Throttles renders to the profile's frame rate and maps the clock to shader time.

use std::time::{Duration, Instant};

use glitch_core::{GlitchProfile, TimeMapping};

use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

/// One frame to render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Value for the `time` uniform
    pub time: f32,
    /// Time since the previous frame
    pub delta: Duration,
}

#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    clock: Clock,
    interval: Duration,
    mapping: TimeMapping,
    last_render: Option<Instant>,
}

impl AnimationDriver {
    pub fn new(interval: Duration, mapping: TimeMapping) -> Self {
        Self {
            state: DriverState::Stopped,
            clock: Clock::new(),
            interval,
            mapping,
            last_render: None,
        }
    }

    pub fn for_profile(profile: &GlitchProfile) -> Self {
        Self::new(profile.frame_interval(), profile.time_mapping)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self, now: Instant) {
        if self.state == DriverState::Running {
            return;
        }
        self.clock.start(now);
        self.last_render = None;
        self.state = DriverState::Running;
        tracing::debug!("Animation driver started at {:?} per frame", self.interval);
    }

    /// Cancels the pending frame
    pub fn stop(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.clock.stop();
        self.last_render = None;
        self.state = DriverState::Stopped;
        tracing::debug!("Animation driver stopped");
    }

    /// A frame when running and at least one interval has passed since the last render
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        if self.state == DriverState::Stopped {
            return None;
        }
        if let Some(last) = self.last_render {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        Some(self.frame(now))
    }

    /// A frame regardless of the throttle; still `None` while stopped
    pub fn force(&mut self, now: Instant) -> Option<Frame> {
        if self.state == DriverState::Stopped {
            return None;
        }
        Some(self.frame(now))
    }

    /// When the next throttled frame becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            DriverState::Stopped => None,
            DriverState::Running => self.last_render.map(|last| last + self.interval),
        }
    }

    fn frame(&mut self, now: Instant) -> Frame {
        self.last_render = Some(now);
        Frame {
            time: self.mapping.apply(self.clock.elapsed(now)),
            delta: self.clock.delta(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn stopped_driver_never_renders() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::for_profile(&GlitchProfile::shaded());
        assert_eq!(driver.tick(t0), None);
        assert_eq!(driver.force(t0), None);
        assert_eq!(driver.next_deadline(), None);
    }

    #[test]
    fn shaded_frames_are_throttled_to_30hz() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::for_profile(&GlitchProfile::shaded());
        driver.start(t0);

        let first = driver.tick(t0).unwrap();
        assert_eq!(first.time, 1.0);
        assert_eq!(driver.tick(t0 + ms(16)), None);
        assert_eq!(driver.tick(t0 + ms(33)), None);

        let second = driver.tick(t0 + ms(34)).unwrap();
        assert!((second.time - 1.034).abs() < 1e-5);
        assert_eq!(second.delta, ms(34));
        assert_eq!(driver.next_deadline(), Some(t0 + ms(34) + driver.interval()));
    }

    #[test]
    fn classic_time_wraps_between_five_and_ten() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::for_profile(&GlitchProfile::classic());
        driver.start(t0);

        assert_eq!(driver.tick(t0).unwrap().time, 5.0);
        let frame = driver.tick(t0 + ms(6_000)).unwrap();
        assert!((frame.time - 6.0).abs() < 1e-4);
    }

    #[test]
    fn force_ignores_the_throttle_and_resets_it() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::for_profile(&GlitchProfile::classic());
        driver.start(t0);
        driver.tick(t0);

        assert!(driver.force(t0 + ms(1)).is_some());
        assert_eq!(driver.tick(t0 + ms(17)), None);
        assert!(driver.tick(t0 + ms(18)).is_some());
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let t0 = Instant::now();
        let mut driver = AnimationDriver::for_profile(&GlitchProfile::shaded());
        driver.start(t0);
        driver.tick(t0);
        driver.stop();

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.tick(t0 + ms(100)), None);
        assert_eq!(driver.next_deadline(), None);
    }
}
