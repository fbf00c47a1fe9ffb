// ABOUTME: Glitch intensity controller: timed ramps of the effect's scale factor.
// ABOUTME: Ramps are schedules of writes applied by tick; a new ramp replaces the running one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glitch_core::{GlitchProfile, GlitchTrigger};

use crate::uniforms::{ParamRegistry, Uniform, SCALE_FACTOR};

/// Scale-factor writes at offsets from the ramp's start
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ramp {
    writes: Vec<(Duration, f32)>,
}

impl Ramp {
    /// `start`, then `start + k * (end - start) / steps` every `delay`, then exactly `end`
    /// at `steps * delay`. Zero steps writes `end` at once.
    pub fn lerp(start: f32, end: f32, steps: u32, delay: Duration) -> Self {
        let mut writes = Vec::with_capacity(steps as usize + 1);
        if steps > 0 {
            let step = (end - start) / steps as f32;
            let mut value = start;
            for k in 0..steps {
                writes.push((delay * k, value));
                value += step;
            }
        }
        writes.push((delay * steps, end));
        Self { writes }
    }

    /// Append `next`, starting when this ramp ends
    pub fn then(mut self, next: Ramp) -> Self {
        let offset = self.duration();
        self.writes
            .extend(next.writes.into_iter().map(|(at, value)| (offset + at, value)));
        self
    }

    pub fn writes(&self) -> &[(Duration, f32)] {
        &self.writes
    }

    pub fn duration(&self) -> Duration {
        self.writes.last().map(|(at, _)| *at).unwrap_or_default()
    }
}

pub struct GlitchController {
    profile: GlitchProfile,
    handles: Vec<Uniform>,
    pending: VecDeque<(Instant, f32)>,
    triggers: u64,
}

impl GlitchController {
    pub fn new(profile: GlitchProfile) -> Self {
        Self {
            profile,
            handles: Vec::new(),
            pending: VecDeque::new(),
            triggers: 0,
        }
    }

    pub fn profile(&self) -> &GlitchProfile {
        &self.profile
    }

    /// Take every scale-factor handle from the registry. Returns how many were bound.
    pub fn bind(&mut self, registry: &ParamRegistry) -> usize {
        self.handles = registry.get(SCALE_FACTOR).to_vec();
        tracing::debug!("Glitch controller bound {} scale factor handles", self.handles.len());
        self.handles.len()
    }

    pub fn set_scale_factor(&self, value: f32) {
        for handle in &self.handles {
            handle.set(value);
        }
    }

    /// Current value of the first bound handle
    pub fn scale_factor(&self) -> Option<f32> {
        self.handles.first().map(Uniform::get)
    }

    /// Replace whatever is running with `ramp`, applying its immediate writes
    pub fn play(&mut self, ramp: Ramp, now: Instant) {
        if !self.pending.is_empty() {
            tracing::debug!("Glitch ramp restarted with {} writes pending", self.pending.len());
        }
        self.pending = ramp.writes.into_iter().map(|(at, value)| (now + at, value)).collect();
        self.tick(now);
    }

    pub fn lerp(&mut self, start: f32, end: f32, steps: u32, delay: Duration, now: Instant) {
        self.play(Ramp::lerp(start, end, steps, delay), now);
    }

    /// low -> mid -> low
    pub fn spike(&mut self, now: Instant) {
        let p = &self.profile;
        let ramp = Ramp::lerp(p.low, p.mid, p.spike_steps, p.spike_delay)
            .then(Ramp::lerp(p.mid, p.low, p.spike_steps, p.spike_delay));
        self.play(ramp, now);
    }

    /// high, then low after the hold
    pub fn pulse(&mut self, now: Instant) {
        let p = &self.profile;
        let ramp = Ramp::lerp(p.high, p.low, 1, p.pulse_hold);
        self.play(ramp, now);
    }

    /// Fire the profile's keystroke glitch
    pub fn trigger(&mut self, now: Instant) {
        self.triggers += 1;
        tracing::debug!("Glitch trigger {:?}", self.profile.trigger);
        match self.profile.trigger {
            GlitchTrigger::Spike => self.spike(now),
            GlitchTrigger::Pulse => self.pulse(now),
        }
    }

    pub fn fade_in(&mut self, steps: u32, now: Instant) {
        let p = &self.profile;
        let ramp = Ramp::lerp(p.high, p.low, steps, p.fade_delay);
        self.play(ramp, now);
    }

    pub fn fade_out(&mut self, steps: u32, now: Instant) {
        let p = &self.profile;
        let ramp = Ramp::lerp(p.low, p.high, steps, p.fade_delay);
        self.play(ramp, now);
    }

    pub fn cancel(&mut self) {
        self.pending.clear();
    }

    /// Apply every write due at `now`, in order. Returns how many were applied.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while let Some(&(due, value)) = self.pending.front() {
            if due > now {
                break;
            }
            self.set_scale_factor(value);
            self.pending.pop_front();
            applied += 1;
        }
        applied
    }

    pub fn is_animating(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the next pending write is due
    pub fn next_write(&self) -> Option<Instant> {
        self.pending.front().map(|(due, _)| *due)
    }

    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn bound(profile: GlitchProfile) -> (GlitchController, Uniform) {
        let handle = Uniform::new(profile.low);
        let registry = ParamRegistry::from_uniforms([(SCALE_FACTOR.to_string(), handle.clone())]);
        let mut controller = GlitchController::new(profile);
        assert_eq!(controller.bind(&registry), 1);
        (controller, handle)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn lerp_writes_steps_plus_one_values() {
        let ramp = Ramp::lerp(0.0, 1.0, 4, ms(25));
        let times: Vec<Duration> = ramp.writes().iter().map(|(at, _)| *at).collect();
        assert_eq!(times, vec![ms(0), ms(25), ms(50), ms(75), ms(100)]);

        let values: Vec<f32> = ramp.writes().iter().map(|(_, v)| *v).collect();
        assert!(close(values[1], 0.25));
        assert!(close(values[3], 0.75));
        assert_eq!(values[4], 1.0);
    }

    #[test]
    fn zero_step_lerp_jumps_to_end() {
        let ramp = Ramp::lerp(0.3, 0.01, 0, ms(50));
        assert_eq!(ramp.writes(), &[(ms(0), 0.01)]);
    }

    #[test]
    fn spike_rises_to_mid_and_returns_to_low() {
        let t0 = Instant::now();
        let (mut glitch, handle) = bound(GlitchProfile::shaded());

        glitch.spike(t0);
        assert!(close(handle.get(), 0.01));

        glitch.tick(t0 + ms(100));
        assert!(close(handle.get(), 0.06));
        assert!(glitch.is_animating());

        glitch.tick(t0 + ms(150));
        assert!(close(handle.get(), 0.035));

        glitch.tick(t0 + ms(200));
        assert_eq!(handle.get(), 0.01);
        assert!(!glitch.is_animating());
    }

    #[test]
    fn pulse_holds_high_for_250ms() {
        let t0 = Instant::now();
        let (mut glitch, handle) = bound(GlitchProfile::classic());

        glitch.trigger(t0);
        assert_eq!(handle.get(), 0.15);
        glitch.tick(t0 + ms(249));
        assert_eq!(handle.get(), 0.15);
        glitch.tick(t0 + ms(250));
        assert_eq!(handle.get(), 0.012);
        assert_eq!(glitch.trigger_count(), 1);
    }

    #[test]
    fn fades_run_between_high_and_low() {
        let t0 = Instant::now();
        let (mut glitch, handle) = bound(GlitchProfile::shaded());

        glitch.fade_in(10, t0);
        assert_eq!(handle.get(), 0.3);
        assert_eq!(glitch.next_write(), Some(t0 + ms(50)));
        glitch.tick(t0 + ms(500));
        assert_eq!(handle.get(), 0.01);

        glitch.fade_out(6, t0 + ms(500));
        assert_eq!(handle.get(), 0.01);
        glitch.tick(t0 + ms(800));
        assert_eq!(handle.get(), 0.3);
    }

    #[test]
    fn fade_in_steps_down_evenly_every_50ms() {
        let t0 = Instant::now();
        let profile = GlitchProfile::shaded();
        let (high, low) = (profile.high, profile.low);
        let (mut glitch, handle) = bound(profile);

        glitch.fade_in(5, t0);
        let mut seen = vec![handle.get()];
        for k in 1..=5u64 {
            glitch.tick(t0 + ms(50 * k - 1));
            assert!(close(handle.get(), *seen.last().unwrap()));
            assert_eq!(glitch.tick(t0 + ms(50 * k)), 1);
            seen.push(handle.get());
        }

        assert_eq!(seen.len(), 6);
        let step = (low - high) / 5.0;
        for (k, value) in seen.iter().enumerate() {
            assert!(close(*value, high + step * k as f32), "step {k}: {value}");
        }
        assert_eq!(seen[5], low);
        assert!(!glitch.is_animating());
    }

    #[test]
    fn new_trigger_cancels_and_restarts() {
        let t0 = Instant::now();
        let (mut glitch, handle) = bound(GlitchProfile::shaded());

        glitch.fade_out(6, t0);
        glitch.tick(t0 + ms(100));
        glitch.trigger(t0 + ms(100));
        assert!(close(handle.get(), 0.01));

        // The fade's final high value never lands
        glitch.tick(t0 + ms(1000));
        assert_eq!(handle.get(), 0.01);
    }

    #[test]
    fn cancel_drops_pending_writes() {
        let t0 = Instant::now();
        let (mut glitch, handle) = bound(GlitchProfile::shaded());

        glitch.spike(t0);
        glitch.cancel();
        assert!(!glitch.is_animating());
        assert_eq!(glitch.tick(t0 + ms(500)), 0);
        assert!(close(handle.get(), 0.01));
    }

    #[test]
    fn set_scale_factor_writes_every_bound_handle() {
        let a = Uniform::new(0.0);
        let b = Uniform::new(0.0);
        let registry = ParamRegistry::from_uniforms([
            (SCALE_FACTOR.to_string(), a.clone()),
            (SCALE_FACTOR.to_string(), b.clone()),
        ]);
        let mut glitch = GlitchController::new(GlitchProfile::shaded());
        glitch.bind(&registry);

        glitch.set_scale_factor(0.2);
        assert_eq!(a.get(), 0.2);
        assert_eq!(b.get(), 0.2);
    }
}
