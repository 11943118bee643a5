//! Side-chain filter boundary.
//!
//! The dynamics stage can insert a filter in front of its detector (for
//! de-essing, bass-insensitive compression, etc.). The stage owns none of
//! the coefficient logic — it talks to the filter only through
//! [`SidechainFilter`]: a value in, a value out, per channel.
//!
//! [`OnePoleSidechain`] is the shipped implementation: a per-channel
//! one-pole (6 dB/oct) low-pass with the recurrence
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! ```
//!
//! where `coeff = exp(-2π * freq / sample_rate)`. Anything fancier (biquads,
//! band-splits) lives outside this crate and just implements the trait.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::TAU;
use libm::expf;

use crate::consts::{clamp_channels, clamp_sample_rate};
use crate::math::flush_denormal;

/// Narrow interface the dynamics stage uses to pre-filter detector input.
pub trait SidechainFilter {
    /// Allocate per-channel state; called from a non-real-time context.
    fn prepare(&mut self, channels: usize, sample_rate: f32);

    /// Filter one detector sample for one channel.
    fn process_sample(&mut self, channel: usize, input: f32) -> f32;

    /// Clear filter state without reallocating.
    fn reset(&mut self);
}

/// Per-channel one-pole low-pass side-chain filter.
#[derive(Debug, Clone)]
pub struct OnePoleSidechain {
    state: Vec<f32>,
    coeff: f32,
    freq: f32,
    sample_rate: f32,
    channels: usize,
}

impl OnePoleSidechain {
    /// Create with a cutoff frequency in Hz.
    pub fn new(freq_hz: f32) -> Self {
        Self {
            state: Vec::new(),
            coeff: 0.0,
            freq: freq_hz,
            sample_rate: 0.0,
            channels: 0,
        }
    }

    /// Set the cutoff frequency, clamped to 20 Hz..=Nyquist.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        if self.sample_rate > 0.0 {
            self.recalculate_coeff();
        }
    }

    fn recalculate_coeff(&mut self) {
        let freq = self.freq.clamp(20.0, self.sample_rate * 0.5);
        self.coeff = expf(-TAU * freq / self.sample_rate);
    }
}

impl SidechainFilter for OnePoleSidechain {
    fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);
        self.state = vec![0.0; self.channels];
        self.recalculate_coeff();
    }

    #[inline]
    fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let y = input + self.coeff * (self.state[channel] - input);
        self.state[channel] = flush_denormal(y);
        self.state[channel]
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
    }
}
