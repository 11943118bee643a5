//! Tagged time quantities for sample-rate-independent configuration.
//!
//! Attack, release, and smoothing times can be expressed in samples,
//! milliseconds, or seconds. Every time-valued setter in the workspace
//! accepts a [`TimeValue`] and converts it internally against the current
//! sample rate, so host code never has to do its own unit math.
//!
//! ```rust
//! use dinamica_core::TimeValue;
//!
//! assert_eq!(TimeValue::Millis(10.0).to_samples(48000.0), 480.0);
//! assert_eq!(TimeValue::Seconds(0.5).to_samples(48000.0), 24000.0);
//! assert_eq!(TimeValue::Samples(128.0).to_samples(48000.0), 128.0);
//! ```

/// A time quantity tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeValue {
    /// Time expressed directly in samples.
    Samples(f32),
    /// Time in milliseconds.
    Millis(f32),
    /// Time in seconds.
    Seconds(f32),
}

impl TimeValue {
    /// Convert to a (fractional) sample count at the given sample rate.
    #[inline]
    pub fn to_samples(self, sample_rate: f32) -> f32 {
        match self {
            TimeValue::Samples(s) => s,
            TimeValue::Millis(ms) => ms * sample_rate / 1000.0,
            TimeValue::Seconds(s) => s * sample_rate,
        }
    }

    /// Convert to seconds at the given sample rate.
    #[inline]
    pub fn to_seconds(self, sample_rate: f32) -> f32 {
        match self {
            TimeValue::Samples(s) => s / sample_rate,
            TimeValue::Millis(ms) => ms / 1000.0,
            TimeValue::Seconds(s) => s,
        }
    }

    /// Convert to milliseconds at the given sample rate.
    #[inline]
    pub fn to_millis(self, sample_rate: f32) -> f32 {
        self.to_seconds(sample_rate) * 1000.0
    }

    /// Instantaneous time (zero samples).
    pub const ZERO: TimeValue = TimeValue::Samples(0.0);
}

impl Default for TimeValue {
    fn default() -> Self {
        TimeValue::ZERO
    }
}
