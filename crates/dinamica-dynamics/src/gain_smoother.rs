//! Ballistic smoothing of the computed gain, in the dB domain.
//!
//! The gain computer emits an instantaneous gain change per sample; applying
//! it raw would distort. [`GainSmoother`] runs one-pole ballistics over the
//! gain *in dB* — perceptually uniform, so a 6 dB move near unity and a 6 dB
//! move deep in reduction take the same time — and converts to linear only
//! at the output.
//!
//! Attack here means the gain is *falling* (reduction engaging), the
//! opposite sense of an envelope follower's attack.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use dinamica_core::{
    ControlledParam, TimeValue, db_to_linear, flush_denormal, one_pole_coeff,
};
use dinamica_core::consts::{clamp_channels, clamp_sample_rate};

const DEFAULT_CONTROL_SMOOTHING: TimeValue = TimeValue::Millis(20.0);

/// Per-channel one-pole gain ballistics in dB.
#[derive(Debug, Clone)]
pub struct GainSmoother {
    /// Per-channel smoothed gain, dB. 0 dB is unity.
    gain_db: Vec<f32>,
    attack_coeff: ControlledParam,
    release_coeff: ControlledParam,
    attack_time: TimeValue,
    release_time: TimeValue,
    sample_rate: f32,
    channels: usize,
}

impl Default for GainSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl GainSmoother {
    /// Create an inert smoother; call [`prepare`](Self::prepare) before use.
    ///
    /// Defaults: 5 ms attack, 50 ms release.
    pub fn new() -> Self {
        Self {
            gain_db: Vec::new(),
            attack_coeff: ControlledParam::exponential(1.0, DEFAULT_CONTROL_SMOOTHING),
            release_coeff: ControlledParam::exponential(1.0, DEFAULT_CONTROL_SMOOTHING),
            attack_time: TimeValue::Millis(5.0),
            release_time: TimeValue::Millis(50.0),
            sample_rate: 0.0,
            channels: 0,
        }
    }

    /// Allocate per-channel state; every channel starts at unity gain.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);
        self.gain_db = vec![0.0; self.channels];
        self.attack_coeff.prepare(self.channels, self.sample_rate);
        self.release_coeff.prepare(self.channels, self.sample_rate);
        self.attack_coeff
            .reset_to(one_pole_coeff(self.attack_time, self.sample_rate));
        self.release_coeff
            .reset_to(one_pole_coeff(self.release_time, self.sample_rate));
    }

    /// Set how fast reduction engages.
    pub fn set_attack_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.attack_time = time;
        if self.sample_rate > 0.0 {
            let coeff = one_pole_coeff(time, self.sample_rate);
            self.attack_coeff.set_target(coeff, None, skip_smoothing);
        }
    }

    /// Set how fast the gain recovers toward unity.
    pub fn set_release_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.release_time = time;
        if self.sample_rate > 0.0 {
            let coeff = one_pole_coeff(time, self.sample_rate);
            self.release_coeff.set_target(coeff, None, skip_smoothing);
        }
    }

    /// Set how fast attack/release coefficient changes glide.
    pub fn set_control_smoothing_time(&mut self, time: TimeValue) {
        self.attack_coeff.set_smoothing_time(time);
        self.release_coeff.set_smoothing_time(time);
    }

    /// Smooth one channel toward `target_db` and return the *linear* gain.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, target_db: f32) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let gain = self.gain_db[channel];
        // Gain falling = reduction engaging = attack.
        let in_attack = f32::from(target_db < gain);
        let attack = self.attack_coeff.next_value(channel);
        let release = self.release_coeff.next_value(channel);
        let coeff = in_attack * attack + (1.0 - in_attack) * release;

        let gain = flush_denormal(gain + coeff * (target_db - gain));
        self.gain_db[channel] = gain;
        db_to_linear(gain)
    }

    /// Smoothed gain of a channel in dB, without advancing.
    #[inline]
    pub fn gain_db(&self, channel: usize) -> f32 {
        self.gain_db[channel]
    }

    /// Snap every channel back to unity gain.
    pub fn reset(&mut self) {
        self.gain_db.fill(0.0);
    }
}
