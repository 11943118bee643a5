//! Controlled parameters: the single substrate for live numeric inputs.
//!
//! Every user-facing, potentially-live-changing numeric input in the engine
//! flows through a [`ControlledParam`] — no parameter may change
//! instantaneously inside the audio callback except through this type. It
//! wraps a base [`Smoother`] plus an independent modulation smoother layered
//! on top of the smoothed base value, for places where a *signal* (not just
//! a user control) continuously perturbs a parameter.
//!
//! ```rust
//! use dinamica_core::{ControlledParam, TimeValue};
//!
//! let mut freq = ControlledParam::exponential(440.0, TimeValue::Millis(20.0));
//! freq.set_bounds(20.0, 20_000.0);
//! freq.prepare(1, 48000.0);
//!
//! freq.set_target(880.0, None, false);
//! let value = freq.next_value(0); // glides toward 880, clamped to bounds
//! assert!(value >= 20.0 && value <= 20_000.0);
//! ```

use crate::smooth::Smoother;
use crate::units::TimeValue;

/// A smoothed parameter with optional bounds and a modulation layer.
///
/// # Invariants
///
/// - When bounds are set, every returned value lies within them; setters
///   silently clamp out-of-range targets.
/// - `prepare` is the only allocation point.
#[derive(Debug, Clone)]
pub struct ControlledParam {
    base: Smoother,
    modulation: Smoother,
    bounds: Option<(f32, f32)>,
}

impl ControlledParam {
    /// Exponentially smoothed parameter with the given control smoothing
    /// time. The modulation smoother uses the same time constant.
    pub fn exponential(initial: f32, smoothing_time: TimeValue) -> Self {
        Self {
            base: Smoother::exponential(initial, smoothing_time),
            modulation: Smoother::exponential(0.0, smoothing_time),
            bounds: None,
        }
    }

    /// Linearly ramped parameter.
    pub fn linear(initial: f32, ramp_time: TimeValue) -> Self {
        Self {
            base: Smoother::linear(initial, ramp_time),
            modulation: Smoother::linear(0.0, ramp_time),
            bounds: None,
        }
    }

    /// Restrict every subsequent read (and target) to `[lo, hi]`.
    pub fn set_bounds(&mut self, lo: f32, hi: f32) {
        self.bounds = Some((lo, hi));
    }

    /// Allocate per-channel state for base and modulation smoothers.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.base.prepare(channels, sample_rate);
        self.modulation.prepare(channels, sample_rate);
    }

    /// Change the base smoothing time (how fast user changes glide).
    pub fn set_smoothing_time(&mut self, time: TimeValue) {
        self.base.set_smoothing_time(time);
        self.modulation.set_smoothing_time(time);
    }

    #[inline]
    fn clamp(&self, value: f32) -> f32 {
        match self.bounds {
            Some((lo, hi)) => value.clamp(lo, hi),
            None => value,
        }
    }

    /// Set the target for one channel (or all with `None`), clamped to the
    /// bounds if set.
    pub fn set_target(&mut self, value: f32, channel: Option<usize>, skip_smoothing: bool) {
        self.base.set_target(self.clamp(value), channel, skip_smoothing);
    }

    /// Advance the base smoother one sample and return the bounded value.
    #[inline]
    pub fn next_value(&mut self, channel: usize) -> f32 {
        let v = self.base.next_value(channel);
        self.clamp(v)
    }

    /// Advance with an additive modulation value layered on top.
    ///
    /// The modulation value is itself smoothed before being added, so an
    /// abruptly changing modulator cannot re-introduce zipper noise.
    #[inline]
    pub fn apply_additive_mod(&mut self, mod_value: f32, channel: usize) -> f32 {
        self.modulation.set_target(mod_value, Some(channel), false);
        let m = self.modulation.next_value(channel);
        let base = self.base.next_value(channel);
        self.clamp(base + m)
    }

    /// Advance with a multiplicative modulation value layered on top.
    ///
    /// The smoother tracks the *deviation from unity* (`mod_value - 1`), so
    /// its resting state of zero is neutral for both combines: a ×1.0
    /// modulator leaves the base untouched even mid-glide after
    /// `prepare`/`reset_to`.
    #[inline]
    pub fn apply_multiplicative_mod(&mut self, mod_value: f32, channel: usize) -> f32 {
        self.modulation.set_target(mod_value - 1.0, Some(channel), false);
        let m = self.modulation.next_value(channel);
        let base = self.base.next_value(channel);
        self.clamp(base * (1.0 + m))
    }

    /// Current bounded value without advancing.
    #[inline]
    pub fn current(&self, channel: usize) -> f32 {
        self.clamp(self.base.current(channel))
    }

    /// Target value of a channel.
    #[inline]
    pub fn target(&self, channel: usize) -> f32 {
        self.base.target(channel)
    }

    /// Snap base state to `value` (clamped) and modulation state to its
    /// neutral (zero deviation: `+0` additively, `×1` multiplicatively).
    pub fn reset_to(&mut self, value: f32) {
        self.base.reset_to(self.clamp(value));
        self.modulation.reset_to(0.0);
    }
}
