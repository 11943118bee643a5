//! Gain computer: smoothed parameters feeding a static curve.
//!
//! [`GainComputer`] owns threshold, ratio, and knee as [`ControlledParam`]s
//! and evaluates its [`GainCurve`] with the per-sample smoothed values, so a
//! threshold ride during a sustained note reshapes the transfer curve
//! click-free.

use core::marker::PhantomData;

use dinamica_core::{ControlledParam, TimeValue, linear_to_db};

use crate::curve::GainCurve;

/// Threshold clamp range (dB).
const THRESHOLD_BOUNDS_DB: (f32, f32) = (-120.0, 24.0);
/// Ratio clamp range.
const RATIO_BOUNDS: (f32, f32) = (1.0, 100.0);
/// Knee width clamp range (dB).
const KNEE_BOUNDS_DB: (f32, f32) = (0.0, 48.0);

const DEFAULT_CONTROL_SMOOTHING: TimeValue = TimeValue::Millis(20.0);

/// Static-curve gain computer with smoothed, bounded parameters.
///
/// Defaults: threshold −18 dB, ratio 4:1, knee 6 dB. Ratio and knee are
/// carried (and advanced) even for curves that ignore them, so switching
/// the curve type never changes parameter bookkeeping.
///
/// Setters may be called before `prepare`; the stored values take effect
/// when `prepare` runs.
#[derive(Debug, Clone)]
pub struct GainComputer<C: GainCurve> {
    threshold_param: ControlledParam,
    ratio_param: ControlledParam,
    knee_param: ControlledParam,
    /// Clamped configuration, the values `prepare` and `reset` land on.
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
    _curve: PhantomData<C>,
}

impl<C: GainCurve> Default for GainComputer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: GainCurve> GainComputer<C> {
    /// Create an inert computer; call [`prepare`](Self::prepare) before use.
    pub fn new() -> Self {
        let mut threshold_param = ControlledParam::exponential(-18.0, DEFAULT_CONTROL_SMOOTHING);
        threshold_param.set_bounds(THRESHOLD_BOUNDS_DB.0, THRESHOLD_BOUNDS_DB.1);

        let mut ratio_param = ControlledParam::exponential(4.0, DEFAULT_CONTROL_SMOOTHING);
        ratio_param.set_bounds(RATIO_BOUNDS.0, RATIO_BOUNDS.1);

        let mut knee_param = ControlledParam::exponential(6.0, DEFAULT_CONTROL_SMOOTHING);
        knee_param.set_bounds(KNEE_BOUNDS_DB.0, KNEE_BOUNDS_DB.1);

        Self {
            threshold_param,
            ratio_param,
            knee_param,
            threshold_db: -18.0,
            ratio: 4.0,
            knee_db: 6.0,
            _curve: PhantomData,
        }
    }

    /// Allocate per-channel parameter state and land on the configured
    /// values immediately — prepare is not a live context.
    pub fn prepare(&mut self, channels: usize, sample_rate: f32) {
        self.threshold_param.prepare(channels, sample_rate);
        self.ratio_param.prepare(channels, sample_rate);
        self.knee_param.prepare(channels, sample_rate);
        self.threshold_param.reset_to(self.threshold_db);
        self.ratio_param.reset_to(self.ratio);
        self.knee_param.reset_to(self.knee_db);
    }

    /// Set the threshold in dB, clamped to library limits.
    pub fn set_threshold_db(&mut self, db: f32, skip_smoothing: bool) {
        self.threshold_db = db.clamp(THRESHOLD_BOUNDS_DB.0, THRESHOLD_BOUNDS_DB.1);
        self.threshold_param
            .set_target(self.threshold_db, None, skip_smoothing);
    }

    /// Set the ratio, clamped to `>= 1`. Ignored by curves without a ratio.
    pub fn set_ratio(&mut self, ratio: f32, skip_smoothing: bool) {
        self.ratio = ratio.clamp(RATIO_BOUNDS.0, RATIO_BOUNDS.1);
        self.ratio_param.set_target(self.ratio, None, skip_smoothing);
    }

    /// Set the knee width in dB, clamped to `>= 0`.
    pub fn set_knee_db(&mut self, db: f32, skip_smoothing: bool) {
        self.knee_db = db.clamp(KNEE_BOUNDS_DB.0, KNEE_BOUNDS_DB.1);
        self.knee_param.set_target(self.knee_db, None, skip_smoothing);
    }

    /// Set how fast live parameter changes glide.
    pub fn set_control_smoothing_time(&mut self, time: TimeValue) {
        self.threshold_param.set_smoothing_time(time);
        self.ratio_param.set_smoothing_time(time);
        self.knee_param.set_smoothing_time(time);
    }

    /// Configured threshold (dB), after clamping.
    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Configured ratio, after clamping.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Configured knee width (dB), after clamping.
    pub fn knee_db(&self) -> f32 {
        self.knee_db
    }

    /// Compute the gain change (dB) for a detected *linear* level.
    ///
    /// Advances all three parameter smoothers by one sample.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, detected_linear: f32) -> f32 {
        let input_db = linear_to_db(detected_linear);
        let threshold = self.threshold_param.next_value(channel);
        let ratio = self.ratio_param.next_value(channel);
        let knee = self.knee_param.next_value(channel);
        C::gain_change_db(input_db, threshold, ratio, knee)
    }

    /// Snap all parameters to their configured values, abandoning any
    /// in-flight glide.
    pub fn reset(&mut self) {
        self.threshold_param.reset_to(self.threshold_db);
        self.ratio_param.reset_to(self.ratio);
        self.knee_param.reset_to(self.knee_db);
    }
}
