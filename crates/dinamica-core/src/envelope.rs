//! Per-channel envelope follower with peak and RMS rectification.
//!
//! Tracks signal loudness for dynamics processing. Two rectification laws
//! share one ballistics shape:
//!
//! - **Peak**: rectify with `|x|`; state is the linear magnitude envelope.
//! - **RMS**: rectify with `x²`; state is the *mean-square* level and the
//!   returned value is `sqrt(state)`.
//!
//! Attack and release are one-pole time constants realized as
//! [`ControlledParam`] coefficients, so coefficient changes themselves glide
//! over the control smoothing time — moving the attack knob mid-stream does
//! not click.
//!
//! ```rust
//! use dinamica_core::{DetectionMode, EnvelopeFollower, TimeValue};
//!
//! let mut env = EnvelopeFollower::new(DetectionMode::Peak);
//! env.set_attack_time(TimeValue::Millis(10.0), true);
//! env.set_release_time(TimeValue::Millis(100.0), true);
//! env.prepare(2, 48000.0);
//!
//! let level = env.process_sample(0, 0.5);
//! assert!(level > 0.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use libm::{fabsf, sqrtf};

use crate::consts::{clamp_channels, clamp_sample_rate};
use crate::math::flush_denormal;
use crate::param::ControlledParam;
use crate::smooth::one_pole_coeff;
use crate::units::TimeValue;

/// Rectification law used by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Absolute-value rectification; envelope is a linear magnitude.
    Peak,
    /// Squared rectification; envelope state is the mean-square level.
    Rms,
}

/// Default control smoothing time for coefficient glides.
const DEFAULT_CONTROL_SMOOTHING: TimeValue = TimeValue::Millis(20.0);

/// Per-channel signal loudness tracker.
///
/// # Invariants
///
/// - `envelope[ch] >= 0` for all channels at all times.
/// - `prepare` is the only allocation point; `process_sample` is
///   allocation-free and branch-free in its attack/release selection.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    mode: DetectionMode,
    /// Per-channel envelope state (linear for Peak, mean-square for Rms).
    envelope: Vec<f32>,
    /// Smoothed one-pole attack coefficient.
    attack_coeff: ControlledParam,
    /// Smoothed one-pole release coefficient.
    release_coeff: ControlledParam,
    attack_time: TimeValue,
    release_time: TimeValue,
    sample_rate: f32,
    channels: usize,
}

impl EnvelopeFollower {
    /// Create an inert follower; call [`prepare`](Self::prepare) before use.
    ///
    /// Defaults: 10 ms attack, 100 ms release.
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            mode,
            envelope: Vec::new(),
            attack_coeff: ControlledParam::exponential(1.0, DEFAULT_CONTROL_SMOOTHING),
            release_coeff: ControlledParam::exponential(1.0, DEFAULT_CONTROL_SMOOTHING),
            attack_time: TimeValue::Millis(10.0),
            release_time: TimeValue::Millis(100.0),
            sample_rate: 0.0,
            channels: 0,
        }
    }

    /// Allocate per-channel state. Channel count and sample rate are clamped
    /// into library limits rather than rejected.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);
        self.envelope = vec![0.0; self.channels];
        self.attack_coeff.prepare(self.channels, self.sample_rate);
        self.release_coeff.prepare(self.channels, self.sample_rate);
        // Re-derive coefficients at the (possibly clamped) rate and land on
        // them immediately — prepare is not a live context.
        self.attack_coeff
            .reset_to(one_pole_coeff(self.attack_time, self.sample_rate));
        self.release_coeff
            .reset_to(one_pole_coeff(self.release_time, self.sample_rate));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            channels = self.channels,
            sample_rate = self.sample_rate,
            mode = ?self.mode,
            "envelope follower prepared"
        );
    }

    /// Set the attack time. With `skip_smoothing` the new coefficient takes
    /// effect on the very next sample.
    pub fn set_attack_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.attack_time = time;
        if self.sample_rate > 0.0 {
            let coeff = one_pole_coeff(time, self.sample_rate);
            self.attack_coeff.set_target(coeff, None, skip_smoothing);
        }
    }

    /// Set the release time.
    pub fn set_release_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.release_time = time;
        if self.sample_rate > 0.0 {
            let coeff = one_pole_coeff(time, self.sample_rate);
            self.release_coeff.set_target(coeff, None, skip_smoothing);
        }
    }

    /// Set how fast attack/release *coefficient changes* glide when the
    /// user moves the knobs live.
    pub fn set_control_smoothing_time(&mut self, time: TimeValue) {
        self.attack_coeff.set_smoothing_time(time);
        self.release_coeff.set_smoothing_time(time);
    }

    /// Switch rectification law while preserving the audible envelope.
    ///
    /// Stored state converts through the linear envelope level: squared into
    /// mean-square for Peak→RMS, square-rooted for RMS→Peak. The returned
    /// level is continuous across the switch.
    pub fn set_mode(&mut self, mode: DetectionMode) {
        if mode == self.mode {
            return;
        }
        match (self.mode, mode) {
            (DetectionMode::Peak, DetectionMode::Rms) => {
                for e in &mut self.envelope {
                    *e *= *e;
                }
            }
            (DetectionMode::Rms, DetectionMode::Peak) => {
                for e in &mut self.envelope {
                    *e = sqrtf(*e);
                }
            }
            _ => {}
        }
        self.mode = mode;
    }

    /// Current detection mode.
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Track one sample and return the detected level (linear magnitude for
    /// both modes; RMS takes the square root of its mean-square state).
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let rectified = match self.mode {
            DetectionMode::Peak => fabsf(input),
            DetectionMode::Rms => input * input,
        };

        let env = self.envelope[channel];
        // Mask, not a branch: per-sample cost is constant either way.
        let in_attack = f32::from(rectified > env);
        let attack = self.attack_coeff.next_value(channel);
        let release = self.release_coeff.next_value(channel);
        let coeff = in_attack * attack + (1.0 - in_attack) * release;

        let env = flush_denormal(env + coeff * (rectified - env));
        self.envelope[channel] = env;

        match self.mode {
            DetectionMode::Peak => env,
            DetectionMode::Rms => sqrtf(env),
        }
    }

    /// Detected level of a channel without advancing.
    #[inline]
    pub fn level(&self, channel: usize) -> f32 {
        match self.mode {
            DetectionMode::Peak => self.envelope[channel],
            DetectionMode::Rms => sqrtf(self.envelope[channel]),
        }
    }

    /// Clear every channel's envelope to zero.
    pub fn reset(&mut self) {
        self.envelope.fill(0.0);
    }

    /// Reset every channel to a caller-supplied *linear* level.
    ///
    /// The value is stored as-is for Peak and squared for RMS, so the
    /// audible level after reset matches regardless of mode.
    pub fn reset_to(&mut self, level: f32) {
        let level = level.max(0.0);
        let stored = match self.mode {
            DetectionMode::Peak => level,
            DetectionMode::Rms => level * level,
        };
        self.envelope.fill(stored);
    }
}
