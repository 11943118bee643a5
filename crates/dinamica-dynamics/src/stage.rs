//! Complete dynamics stage: detector, gain computer, gain ballistics.
//!
//! [`DynamicsStage`] wires an [`EnvelopeFollower`], a [`GainComputer`], and a
//! [`GainSmoother`] into one per-channel processor, with an optional
//! side-chain filter ahead of the detector and a feedforward/feedback
//! topology switch. The curve is chosen at the type level — see the
//! [`Compressor`], [`DownwardExpander`], [`UpwardExpander`], [`Limiter`],
//! and [`Gate`] aliases — so the per-sample curve call dispatches statically.
//!
//! ```rust
//! use dinamica_dynamics::Compressor;
//!
//! let mut comp = Compressor::new();
//! comp.set_threshold_db(-20.0, true);
//! comp.set_ratio(4.0, true);
//! comp.prepare(2, 48000.0);
//!
//! let out = comp.process_sample(0, 0.8);
//! assert!(out.abs() <= 0.8);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use dinamica_core::consts::{clamp_channels, clamp_sample_rate};
use dinamica_core::{DetectionMode, EnvelopeFollower, SidechainFilter, TimeValue};

use crate::computer::GainComputer;
use crate::curve::{
    CompressorCurve, DownwardExpanderCurve, GainCurve, GateCurve, LimiterCurve,
    UpwardExpanderCurve,
};
use crate::gain_smoother::GainSmoother;

/// Where the detector taps its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionTopology {
    /// Detect from the stage input (or an external side-chain signal).
    #[default]
    Feedforward,
    /// Detect from the stage's own previous output sample. Smoother in
    /// character; the one-sample delay keeps it causal.
    Feedback,
}

/// A full dynamics processor over a statically chosen gain curve.
///
/// Deliberately not `Clone` (the per-channel ballistic state is tied to one
/// audio stream, and duplicating it mid-stream is never meaningful) and not
/// `Debug` (the side-chain filter is an opaque trait object).
pub struct DynamicsStage<C: GainCurve> {
    detector: EnvelopeFollower,
    computer: GainComputer<C>,
    gain: GainSmoother,
    sidechain: Option<Box<dyn SidechainFilter>>,
    topology: DetectionTopology,
    /// Previous output sample per channel, the feedback detector tap.
    previous_output: Vec<f32>,
    /// Smallest linear gain applied per channel since the last meter reset.
    max_gain_reduction: Vec<f32>,
    channels: usize,
    sample_rate: f32,
}

impl<C: GainCurve> Default for DynamicsStage<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: GainCurve> DynamicsStage<C> {
    /// Create an inert stage; call [`prepare`](Self::prepare) before use.
    pub fn new() -> Self {
        Self {
            detector: EnvelopeFollower::new(DetectionMode::Peak),
            computer: GainComputer::new(),
            gain: GainSmoother::new(),
            sidechain: None,
            topology: DetectionTopology::Feedforward,
            previous_output: Vec::new(),
            max_gain_reduction: Vec::new(),
            channels: 0,
            sample_rate: 0.0,
        }
    }

    /// Allocate all per-channel state. The only allocation point; safe to
    /// call again on a reconfigured host.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.channels = clamp_channels(channels);
        self.sample_rate = clamp_sample_rate(sample_rate);

        self.detector.prepare(self.channels, self.sample_rate);
        self.computer.prepare(self.channels, self.sample_rate);
        self.gain.prepare(self.channels, self.sample_rate);
        if let Some(filter) = self.sidechain.as_mut() {
            filter.prepare(self.channels, self.sample_rate);
        }
        self.previous_output = vec![0.0; self.channels];
        self.max_gain_reduction = vec![1.0; self.channels];

        #[cfg(feature = "tracing")]
        tracing::debug!(
            channels = self.channels,
            sample_rate = self.sample_rate,
            "dynamics stage prepared"
        );
    }

    /// Clear all runtime state without reallocating.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.computer.reset();
        self.gain.reset();
        if let Some(filter) = self.sidechain.as_mut() {
            filter.reset();
        }
        self.previous_output.fill(0.0);
        self.max_gain_reduction.fill(1.0);
    }

    /// Install (or remove) a filter ahead of the detector.
    ///
    /// An installed filter is prepared immediately if the stage already is.
    pub fn set_sidechain_filter(&mut self, filter: Option<Box<dyn SidechainFilter>>) {
        self.sidechain = filter;
        if self.channels > 0
            && let Some(f) = self.sidechain.as_mut()
        {
            f.prepare(self.channels, self.sample_rate);
        }
    }

    /// Switch the detector tap. State carries over; the detector simply
    /// starts tracking the other signal.
    pub fn set_topology(&mut self, topology: DetectionTopology) {
        self.topology = topology;
    }

    /// Current detector tap.
    pub fn topology(&self) -> DetectionTopology {
        self.topology
    }

    /// Run the detector-computer-smoother chain for one detector sample and
    /// apply the resulting gain to `input`.
    #[inline]
    fn advance(&mut self, channel: usize, input: f32, detector_input: f32) -> f32 {
        let key = match self.sidechain.as_mut() {
            Some(filter) => filter.process_sample(channel, detector_input),
            None => detector_input,
        };
        let level = self.detector.process_sample(channel, key);
        let target_db = self.computer.process_sample(channel, level);
        let gain = self.gain.process_sample(channel, target_db);

        let out = input * gain;
        self.previous_output[channel] = out;
        self.max_gain_reduction[channel] = self.max_gain_reduction[channel].min(gain);
        out
    }

    /// Process one sample, detecting from the stage's own signal path
    /// (input for feedforward, previous output for feedback).
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let detector_input = match self.topology {
            DetectionTopology::Feedforward => input,
            DetectionTopology::Feedback => self.previous_output[channel],
        };
        self.advance(channel, input, detector_input)
    }

    /// Process one sample with an external side-chain signal driving the
    /// detector (ducking, keyed gating).
    ///
    /// Only meaningful feedforward; a feedback stage keeps detecting from
    /// its own previous output and ignores `sidechain_input`.
    #[inline]
    pub fn process_sample_sidechained(
        &mut self,
        channel: usize,
        input: f32,
        sidechain_input: f32,
    ) -> f32 {
        debug_assert!(channel < self.channels, "channel {channel} out of range");
        let detector_input = match self.topology {
            DetectionTopology::Feedforward => sidechain_input,
            DetectionTopology::Feedback => self.previous_output[channel],
        };
        self.advance(channel, input, detector_input)
    }

    /// Process a block of non-interleaved channel slices.
    ///
    /// `detector_inputs`, when given, drives the detector instead of
    /// `inputs` (feedforward only). The gain-reduction meter is reset at the
    /// start of the block, so [`gain_reduction`](Self::gain_reduction)
    /// afterwards reports this block's deepest reduction.
    pub fn process_block(
        &mut self,
        inputs: &[&[f32]],
        detector_inputs: Option<&[&[f32]]>,
        outputs: &mut [&mut [f32]],
    ) {
        debug_assert_eq!(inputs.len(), outputs.len());
        debug_assert!(inputs.len() <= self.channels, "more slices than prepared channels");
        if let Some(keys) = detector_inputs {
            debug_assert_eq!(keys.len(), inputs.len());
        }

        self.max_gain_reduction.fill(1.0);

        for (ch, (input, output)) in inputs.iter().zip(outputs.iter_mut()).enumerate() {
            debug_assert_eq!(input.len(), output.len());
            match detector_inputs {
                Some(keys) => {
                    for ((x, y), &k) in input.iter().zip(output.iter_mut()).zip(keys[ch]) {
                        *y = self.process_sample_sidechained(ch, *x, k);
                    }
                }
                None => {
                    for (x, y) in input.iter().zip(output.iter_mut()) {
                        *y = self.process_sample(ch, *x);
                    }
                }
            }
        }
    }

    /// Deepest linear gain applied to a channel since the last meter reset
    /// (1.0 = no reduction).
    #[inline]
    pub fn gain_reduction(&self, channel: usize) -> f32 {
        self.max_gain_reduction[channel]
    }

    /// Reset the gain-reduction meter to 1.0 on every channel. Called
    /// automatically at the start of [`process_block`](Self::process_block).
    pub fn reset_gain_reduction(&mut self) {
        self.max_gain_reduction.fill(1.0);
    }

    // Parameter forwarding.

    /// Set the threshold in dB.
    pub fn set_threshold_db(&mut self, db: f32, skip_smoothing: bool) {
        self.computer.set_threshold_db(db, skip_smoothing);
    }

    /// Set the ratio. Ignored by limiter and gate curves.
    pub fn set_ratio(&mut self, ratio: f32, skip_smoothing: bool) {
        self.computer.set_ratio(ratio, skip_smoothing);
    }

    /// Set the knee width in dB. Ignored by limiter and gate curves.
    pub fn set_knee_db(&mut self, db: f32, skip_smoothing: bool) {
        self.computer.set_knee_db(db, skip_smoothing);
    }

    /// Switch the detector between peak and RMS rectification. The detected
    /// level is continuous across the switch.
    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.detector.set_mode(mode);
    }

    /// Set the detector attack time.
    pub fn set_attack_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.detector.set_attack_time(time, skip_smoothing);
    }

    /// Set the detector release time.
    pub fn set_release_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.detector.set_release_time(time, skip_smoothing);
    }

    /// Set how fast gain reduction engages.
    pub fn set_gain_attack_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.gain.set_attack_time(time, skip_smoothing);
    }

    /// Set how fast the gain recovers toward unity.
    pub fn set_gain_release_time(&mut self, time: TimeValue, skip_smoothing: bool) {
        self.gain.set_release_time(time, skip_smoothing);
    }

    /// Set how fast live parameter changes glide, across the whole stage.
    pub fn set_control_smoothing_time(&mut self, time: TimeValue) {
        self.computer.set_control_smoothing_time(time);
        self.detector.set_control_smoothing_time(time);
        self.gain.set_control_smoothing_time(time);
    }
}

/// Downward compressor stage.
pub type Compressor = DynamicsStage<CompressorCurve>;
/// Downward expander stage.
pub type DownwardExpander = DynamicsStage<DownwardExpanderCurve>;
/// Upward expander stage.
pub type UpwardExpander = DynamicsStage<UpwardExpanderCurve>;
/// Hard limiter stage.
pub type Limiter = DynamicsStage<LimiterCurve>;
/// Noise gate stage.
pub type Gate = DynamicsStage<GateCurve>;
