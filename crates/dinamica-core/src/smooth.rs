//! Per-channel parameter smoothing for zipper-free changes.
//!
//! Discrete parameter changes (a user grabbing a knob, a host automation
//! point) must not reach the audio path as steps. This module provides two
//! interchangeable smoothing strategies, each holding independent state per
//! channel:
//!
//! - [`ExponentialSmoother`] - one-pole lowpass response, optionally
//!   cascaded up to [`MAX_CASCADE_ORDER`] stages for an S-shaped transition
//! - [`LinearSmoother`] - constant-rate ramp that arrives at the target
//!   *exactly* after the configured time
//!
//! [`Smoother`] wraps both behind a tagged variant so owners can select the
//! strategy at runtime without generics.
//!
//! ## Usage
//!
//! ```rust
//! use dinamica_core::{ExponentialSmoother, TimeValue};
//!
//! let mut gain = ExponentialSmoother::new(1.0, TimeValue::Millis(10.0));
//! gain.prepare(2, 48000.0);
//!
//! gain.set_target(0.5, None, false);
//! for _ in 0..480 {
//!     let _smoothed = gain.next_value(0);
//! }
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use libm::{expf, roundf};

use crate::consts::{clamp_channels, clamp_sample_rate};
use crate::units::TimeValue;

/// Maximum number of cascaded one-pole stages in an [`ExponentialSmoother`].
pub const MAX_CASCADE_ORDER: usize = 8;

/// Compute the one-pole coefficient for a smoothing time.
///
/// A one-pole lowpass has the difference equation
/// `y[n] = y[n-1] + coeff * (target - y[n-1])`, a first-order IIR with pole
/// at `(1 - coeff)`. The time constant tau (time to reach 63.2% of target)
/// relates to the coefficient by:
///
/// `coeff = 1 - exp(-1 / (tau * sample_rate))`
///
/// Times of one sample or less (including zero) are deliberately treated as
/// *instant*: the coefficient is 1.0 and the value lands on its target in a
/// single step, so `TimeValue::ZERO` means "no smoothing" rather than a
/// 63.2% step. Longer times yield a coefficient in (0, 1) and the recurrence
/// is stable up to smoothing times of multiple seconds.
#[inline]
pub fn one_pole_coeff(time: TimeValue, sample_rate: f32) -> f32 {
    let samples = time.to_samples(sample_rate);
    if samples <= 1.0 {
        1.0 // Instant (no smoothing)
    } else {
        1.0 - expf(-1.0 / samples)
    }
}

/// Exponentially smoothed per-channel value.
///
/// Each channel runs `order` cascaded one-pole stages; the output of stage
/// *i* feeds stage *i+1* and the final stage is the public value. Order 1 is
/// a plain one-pole lowpass on parameter changes; higher orders approximate
/// a smoother, Gaussian-like ramp at the cost of one multiply-add per extra
/// stage.
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    /// Per-channel target values.
    targets: Vec<f32>,
    /// Cascade state, `order` entries per channel (channel-major).
    stages: Vec<f32>,
    /// Number of cascaded one-pole stages (1..=[`MAX_CASCADE_ORDER`]).
    order: usize,
    /// One-pole coefficient shared by every stage.
    coeff: f32,
    /// Value channels are initialized to at `prepare`/`reset`.
    initial: f32,
    smoothing_time: TimeValue,
    sample_rate: f32,
    channels: usize,
}

impl ExponentialSmoother {
    /// Create an inert smoother; call [`prepare`](Self::prepare) before use.
    pub fn new(initial: f32, smoothing_time: TimeValue) -> Self {
        Self::with_order(initial, smoothing_time, 1)
    }

    /// Create with a cascade order, clamped to 1..=[`MAX_CASCADE_ORDER`].
    pub fn with_order(initial: f32, smoothing_time: TimeValue, order: usize) -> Self {
        Self {
            targets: Vec::new(),
            stages: Vec::new(),
            order: order.clamp(1, MAX_CASCADE_ORDER),
            coeff: 1.0,
            initial,
            smoothing_time,
            sample_rate: 0.0,
            channels: 0,
        }
    }

    /// Allocate per-channel state. The only allocation point; real-time
    /// methods never allocate. Channel count and sample rate are clamped
    /// into library limits rather than rejected.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);
        self.targets = vec![self.initial; self.channels];
        self.stages = vec![self.initial; self.channels * self.order];
        self.coeff = one_pole_coeff(self.smoothing_time, self.sample_rate);
    }

    /// Change the smoothing time; takes effect from the next sample.
    pub fn set_smoothing_time(&mut self, time: TimeValue) {
        self.smoothing_time = time;
        if self.sample_rate > 0.0 {
            self.coeff = one_pole_coeff(time, self.sample_rate);
        }
    }

    /// Set the target for one channel, or all channels when `channel` is
    /// `None`. With `skip_smoothing` the current value and every cascade
    /// stage jump to the target immediately.
    pub fn set_target(&mut self, value: f32, channel: Option<usize>, skip_smoothing: bool) {
        match channel {
            Some(ch) => {
                debug_assert!(ch < self.channels, "channel {ch} out of range");
                self.targets[ch] = value;
                if skip_smoothing {
                    self.stages[ch * self.order..(ch + 1) * self.order].fill(value);
                }
            }
            None => {
                self.targets.fill(value);
                if skip_smoothing {
                    self.stages.fill(value);
                }
            }
        }
    }

    /// Advance one channel by one sample and return its new value.
    #[inline]
    pub fn next_value(&mut self, channel: usize) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let mut input = self.targets[channel];
        let base = channel * self.order;
        for stage in &mut self.stages[base..base + self.order] {
            *stage += self.coeff * (input - *stage);
            input = *stage;
        }
        input
    }

    /// Current value of a channel without advancing.
    #[inline]
    pub fn current(&self, channel: usize) -> f32 {
        self.stages[channel * self.order + self.order - 1]
    }

    /// Target value of a channel.
    #[inline]
    pub fn target(&self, channel: usize) -> f32 {
        self.targets[channel]
    }

    /// Snap every channel's state and target to `value` without
    /// reallocating.
    pub fn reset_to(&mut self, value: f32) {
        self.targets.fill(value);
        self.stages.fill(value);
    }

    /// Cascade order.
    pub fn order(&self) -> usize {
        self.order
    }
}

/// Linearly smoothed per-channel value.
///
/// On `set_target` each channel computes a per-sample step over
/// `max(1, round(time * fs))` samples; when the remaining-sample counter
/// hits zero the value snaps exactly to the target, avoiding residual
/// floating-point drift.
#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: Vec<f32>,
    targets: Vec<f32>,
    steps: Vec<f32>,
    remaining: Vec<u32>,
    initial: f32,
    ramp_time: TimeValue,
    sample_rate: f32,
    channels: usize,
}

impl LinearSmoother {
    /// Create an inert smoother; call [`prepare`](Self::prepare) before use.
    pub fn new(initial: f32, ramp_time: TimeValue) -> Self {
        Self {
            current: Vec::new(),
            targets: Vec::new(),
            steps: Vec::new(),
            remaining: Vec::new(),
            initial,
            ramp_time,
            sample_rate: 0.0,
            channels: 0,
        }
    }

    /// Allocate per-channel state. Channel count and sample rate are clamped
    /// into library limits rather than rejected.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);
        self.current = vec![self.initial; self.channels];
        self.targets = vec![self.initial; self.channels];
        self.steps = vec![0.0; self.channels];
        self.remaining = vec![0; self.channels];
    }

    /// Change the ramp time used by subsequent `set_target` calls.
    pub fn set_smoothing_time(&mut self, time: TimeValue) {
        self.ramp_time = time;
    }

    fn ramp_samples(&self) -> u32 {
        roundf(self.ramp_time.to_samples(self.sample_rate)).max(1.0) as u32
    }

    fn start_ramp(&mut self, ch: usize, value: f32, skip_smoothing: bool) {
        self.targets[ch] = value;
        if skip_smoothing {
            self.current[ch] = value;
            self.steps[ch] = 0.0;
            self.remaining[ch] = 0;
            return;
        }
        let samples = self.ramp_samples();
        self.steps[ch] = (value - self.current[ch]) / samples as f32;
        self.remaining[ch] = samples;
    }

    /// Set the target for one channel, or all channels when `channel` is
    /// `None`.
    pub fn set_target(&mut self, value: f32, channel: Option<usize>, skip_smoothing: bool) {
        match channel {
            Some(ch) => {
                debug_assert!(ch < self.channels, "channel {ch} out of range");
                self.start_ramp(ch, value, skip_smoothing);
            }
            None => {
                for ch in 0..self.channels {
                    self.start_ramp(ch, value, skip_smoothing);
                }
            }
        }
    }

    /// Advance one channel by one sample and return its new value.
    #[inline]
    pub fn next_value(&mut self, channel: usize) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        if self.remaining[channel] > 0 {
            self.current[channel] += self.steps[channel];
            self.remaining[channel] -= 1;
            if self.remaining[channel] == 0 {
                // Snap to exact target
                self.current[channel] = self.targets[channel];
            }
        }
        self.current[channel]
    }

    /// Current value of a channel without advancing.
    #[inline]
    pub fn current(&self, channel: usize) -> f32 {
        self.current[channel]
    }

    /// Target value of a channel.
    #[inline]
    pub fn target(&self, channel: usize) -> f32 {
        self.targets[channel]
    }

    /// Snap every channel's state and target to `value`.
    pub fn reset_to(&mut self, value: f32) {
        self.current.fill(value);
        self.targets.fill(value);
        self.steps.fill(0.0);
        self.remaining.fill(0);
    }
}

/// Runtime-selectable smoothing strategy.
///
/// The two strategies share the same contract (`prepare` / `set_target` /
/// `next_value`), so owners that don't care which one is in use can hold a
/// `Smoother` and forward calls.
#[derive(Debug, Clone)]
pub enum Smoother {
    /// Exponential (one-pole cascade) smoothing.
    Exponential(ExponentialSmoother),
    /// Linear constant-rate ramp.
    Linear(LinearSmoother),
}

impl Smoother {
    /// Exponential strategy with cascade order 1.
    pub fn exponential(initial: f32, time: TimeValue) -> Self {
        Smoother::Exponential(ExponentialSmoother::new(initial, time))
    }

    /// Linear ramp strategy.
    pub fn linear(initial: f32, time: TimeValue) -> Self {
        Smoother::Linear(LinearSmoother::new(initial, time))
    }

    /// Allocate per-channel state.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        match self {
            Smoother::Exponential(s) => s.prepare(channels, sample_rate),
            Smoother::Linear(s) => s.prepare(channels, sample_rate),
        }
    }

    /// Change the smoothing/ramp time.
    pub fn set_smoothing_time(&mut self, time: TimeValue) {
        match self {
            Smoother::Exponential(s) => s.set_smoothing_time(time),
            Smoother::Linear(s) => s.set_smoothing_time(time),
        }
    }

    /// Set the target for one channel, or all when `channel` is `None`.
    pub fn set_target(&mut self, value: f32, channel: Option<usize>, skip_smoothing: bool) {
        match self {
            Smoother::Exponential(s) => s.set_target(value, channel, skip_smoothing),
            Smoother::Linear(s) => s.set_target(value, channel, skip_smoothing),
        }
    }

    /// Advance one channel by one sample.
    #[inline]
    pub fn next_value(&mut self, channel: usize) -> f32 {
        match self {
            Smoother::Exponential(s) => s.next_value(channel),
            Smoother::Linear(s) => s.next_value(channel),
        }
    }

    /// Current value without advancing.
    #[inline]
    pub fn current(&self, channel: usize) -> f32 {
        match self {
            Smoother::Exponential(s) => s.current(channel),
            Smoother::Linear(s) => s.current(channel),
        }
    }

    /// Target value of a channel.
    #[inline]
    pub fn target(&self, channel: usize) -> f32 {
        match self {
            Smoother::Exponential(s) => s.target(channel),
            Smoother::Linear(s) => s.target(channel),
        }
    }

    /// Snap state and target of every channel to `value`.
    pub fn reset_to(&mut self, value: f32) {
        match self {
            Smoother::Exponential(s) => s.reset_to(value),
            Smoother::Linear(s) => s.reset_to(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn exponential_converges_monotonically() {
        let mut s = ExponentialSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1, SR);
        s.set_target(1.0, None, false);

        let mut prev = 0.0;
        for _ in 0..(SR as usize / 20) {
            let v = s.next_value(0);
            assert!(v >= prev, "exponential approach must be monotonic");
            prev = v;
        }
        assert!((prev - 1.0).abs() < 0.01, "should converge, got {prev}");
    }

    #[test]
    fn exponential_time_constant() {
        let mut s = ExponentialSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1, SR);
        s.set_target(1.0, None, false);

        // After one time constant (~10ms), a single pole reaches ~63.2%
        let samples = (SR * 0.010) as usize;
        let mut v = 0.0;
        for _ in 0..samples {
            v = s.next_value(0);
        }
        let expected = 1.0 - expf(-1.0);
        assert!(
            (v - expected).abs() < 0.05,
            "expected ~{expected}, got {v}"
        );
    }

    #[test]
    fn skip_smoothing_snaps_immediately() {
        let mut s = ExponentialSmoother::with_order(0.0, TimeValue::Seconds(2.0), 4);
        s.prepare(2, SR);
        s.set_target(0.75, Some(1), true);
        assert_eq!(s.next_value(1), 0.75);
        // Other channel untouched
        assert_eq!(s.next_value(0), 0.0);
    }

    #[test]
    fn cascade_order_is_clamped() {
        let s = ExponentialSmoother::with_order(0.0, TimeValue::Millis(5.0), 99);
        assert_eq!(s.order(), MAX_CASCADE_ORDER);
        let s = ExponentialSmoother::with_order(0.0, TimeValue::Millis(5.0), 0);
        assert_eq!(s.order(), 1);
    }

    #[test]
    fn higher_order_lags_first_order() {
        let mut first = ExponentialSmoother::with_order(0.0, TimeValue::Millis(10.0), 1);
        let mut fourth = ExponentialSmoother::with_order(0.0, TimeValue::Millis(10.0), 4);
        first.prepare(1, SR);
        fourth.prepare(1, SR);
        first.set_target(1.0, None, false);
        fourth.set_target(1.0, None, false);

        // Early in the transition the cascaded output must trail the single
        // pole (the S-shaped onset).
        let mut v1 = 0.0;
        let mut v4 = 0.0;
        for _ in 0..48 {
            v1 = first.next_value(0);
            v4 = fourth.next_value(0);
        }
        assert!(v4 < v1, "cascade onset should lag: order1={v1}, order4={v4}");
    }

    #[test]
    fn linear_reaches_target_exactly() {
        let mut s = LinearSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1, SR);
        s.set_target(1.0, None, false);

        let samples = (SR * 0.010) as usize;
        let mut v = 0.0;
        for _ in 0..samples {
            v = s.next_value(0);
        }
        assert_eq!(v, 1.0, "linear ramp must arrive exactly");
        // Stays there
        assert_eq!(s.next_value(0), 1.0);
    }

    #[test]
    fn linear_constant_rate() {
        let mut s = LinearSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1, SR);
        s.set_target(1.0, None, false);

        let half = (SR * 0.005) as usize;
        let mut v = 0.0;
        for _ in 0..half {
            v = s.next_value(0);
        }
        assert!((v - 0.5).abs() < 0.01, "should be halfway, got {v}");
    }

    #[test]
    fn sub_sample_time_clamps_to_one_sample() {
        let mut e = ExponentialSmoother::new(0.0, TimeValue::Samples(0.01));
        e.prepare(1, SR);
        e.set_target(1.0, None, false);
        assert_eq!(e.next_value(0), 1.0, "sub-sample time is instant");

        let mut l = LinearSmoother::new(0.0, TimeValue::Samples(0.2));
        l.prepare(1, SR);
        l.set_target(1.0, None, false);
        assert_eq!(l.next_value(0), 1.0, "ramp takes at least one sample");
    }

    #[test]
    fn prepare_clamps_sample_rate_into_limits() {
        // A bogus 1 GHz rate clamps to MAX_SAMPLE_RATE, so a 10 ms time
        // constant still spans a sane number of samples.
        let mut s = ExponentialSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1, 1e9);
        s.set_target(1.0, None, false);

        let samples = (crate::consts::MAX_SAMPLE_RATE * 0.010) as usize;
        let mut v = 0.0;
        for _ in 0..samples {
            v = s.next_value(0);
        }
        assert!(v > 0.5, "sample rate was not clamped: {v} after one time constant");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn prepare_clamps_excess_channels() {
        let mut s = ExponentialSmoother::new(0.0, TimeValue::Millis(10.0));
        s.prepare(1000, SR);
        // Clamped to MAX_CHANNELS, so the first channel past the limit is
        // rejected by the precondition check.
        s.next_value(crate::consts::MAX_CHANNELS);
    }

    #[test]
    fn channels_are_independent() {
        let mut s = Smoother::exponential(0.0, TimeValue::Millis(5.0));
        s.prepare(3, SR);
        s.set_target(1.0, Some(2), false);

        for _ in 0..2000 {
            s.next_value(0);
            s.next_value(2);
        }
        assert_eq!(s.current(0), 0.0);
        assert!(s.current(2) > 0.99);
    }
}
