// ABOUTME: Glitch overlay profiles: intensity constants, frame rate, layer and refresh policy.
// ABOUTME: Two variants exist, "shaded" (spike glitch, 30 Hz) and "classic" (pulse glitch, 60 Hz).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which overlay behaviour to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Fixed three-layer stack, per-layer refresh, ramped spike on ENTER/TAB
    #[default]
    Shaded,
    /// Layers sorted by z-index, refresh-all, high/low pulse on ENTER/TAB
    Classic,
}

impl Variant {
    pub fn profile(&self) -> GlitchProfile {
        match self {
            Variant::Shaded => GlitchProfile::shaded(),
            Variant::Classic => GlitchProfile::classic(),
        }
    }
}

/// How terminal canvases are assigned scene depths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrder {
    /// Canvases arrive as (link, cursor, screen); depths screen 0, cursor 1, link 2
    Fixed,
    /// Sort canvases by z-index (unset = 0); depth is the sorted position
    ZIndex,
}

/// Which textures a terminal or pointer event invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Content events refresh screen+cursor, pointer/selection events refresh link
    PerLayer,
    /// Every event refreshes every layer and renders immediately
    All,
}

/// Maps clock elapsed seconds to the shader's `time` uniform.
/// The constants are phase choices of the shader and must stay as they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeMapping {
    /// `elapsed + offset`
    Offset(f32),
    /// `elapsed % period + offset`
    Wrap { period: f32, offset: f32 },
}

impl TimeMapping {
    pub fn apply(&self, elapsed: f32) -> f32 {
        match *self {
            TimeMapping::Offset(offset) => elapsed + offset,
            TimeMapping::Wrap { period, offset } => elapsed % period + offset,
        }
    }
}

/// What an ENTER/TAB keystroke does to the scale factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchTrigger {
    /// low -> mid -> low in two short ramps
    Spike,
    /// jump to high, fall back to low after a hold
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchProfile {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
    /// Target frames per second of the animation driver
    pub frame_rate: f32,
    pub time_mapping: TimeMapping,
    pub layer_order: LayerOrder,
    pub refresh: RefreshPolicy,
    pub trigger: GlitchTrigger,
    pub spike_steps: u32,
    pub spike_delay: Duration,
    pub pulse_hold: Duration,
    pub fade_delay: Duration,
}

impl GlitchProfile {
    pub fn shaded() -> Self {
        Self {
            low: 0.01,
            mid: 0.06,
            high: 0.3,
            frame_rate: 30.0,
            time_mapping: TimeMapping::Offset(1.0),
            layer_order: LayerOrder::Fixed,
            refresh: RefreshPolicy::PerLayer,
            trigger: GlitchTrigger::Spike,
            spike_steps: 4,
            spike_delay: Duration::from_millis(25),
            pulse_hold: Duration::from_millis(250),
            fade_delay: Duration::from_millis(50),
        }
    }

    pub fn classic() -> Self {
        Self {
            low: 0.012,
            // Classic has no ramp; its spike peak is the high value
            mid: 0.15,
            high: 0.15,
            frame_rate: 60.0,
            time_mapping: TimeMapping::Wrap {
                period: 5.0,
                offset: 5.0,
            },
            layer_order: LayerOrder::ZIndex,
            refresh: RefreshPolicy::All,
            trigger: GlitchTrigger::Pulse,
            spike_steps: 4,
            spike_delay: Duration::from_millis(25),
            pulse_hold: Duration::from_millis(250),
            fade_delay: Duration::from_millis(50),
        }
    }

    /// Minimum time between two rendered frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1.0) as f64)
    }
}

impl Default for GlitchProfile {
    fn default() -> Self {
        Self::shaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_mapping_adds_one() {
        let mapping = GlitchProfile::shaded().time_mapping;
        assert_eq!(mapping.apply(0.0), 1.0);
        assert_eq!(mapping.apply(12.5), 13.5);
    }

    #[test]
    fn wrap_mapping_stays_between_five_and_ten() {
        let mapping = GlitchProfile::classic().time_mapping;
        assert_eq!(mapping.apply(0.0), 5.0);
        assert!((mapping.apply(7.25) - 7.25).abs() < 1e-6);
        for i in 0..100 {
            let t = mapping.apply(i as f32 * 0.37);
            assert!((5.0..10.0).contains(&t));
        }
    }

    #[test]
    fn frame_intervals_match_rates() {
        let shaded = GlitchProfile::shaded().frame_interval();
        let classic = GlitchProfile::classic().frame_interval();
        assert_eq!(shaded.as_micros(), 33_333);
        assert_eq!(classic.as_micros(), 16_666);
    }

    #[test]
    fn variants_pick_their_policies() {
        let shaded = Variant::Shaded.profile();
        assert_eq!(shaded.layer_order, LayerOrder::Fixed);
        assert_eq!(shaded.refresh, RefreshPolicy::PerLayer);
        assert_eq!(shaded.trigger, GlitchTrigger::Spike);

        let classic = Variant::Classic.profile();
        assert_eq!(classic.layer_order, LayerOrder::ZIndex);
        assert_eq!(classic.refresh, RefreshPolicy::All);
        assert_eq!(classic.trigger, GlitchTrigger::Pulse);
        assert_eq!(classic.low, 0.012);
    }
}
