//! Library-wide limits applied by every `prepare` call.
//!
//! These are explicit constants rather than process-wide mutable
//! configuration: `prepare(channels, sample_rate)` clamps its arguments into
//! these ranges instead of failing, so a misconfigured host degrades to a
//! working (if unexpected) engine rather than an unusable one.

/// Maximum number of independent processing channels.
pub const MAX_CHANNELS: usize = 64;

/// Minimum supported sample rate in Hz.
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;

/// Maximum supported sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

/// Clamp a requested channel count into the supported range.
///
/// Zero channels is allowed — it yields an inert instance whose process
/// calls must not be reached (a caller bug caught by debug assertions).
#[inline]
pub fn clamp_channels(channels: usize) -> usize {
    channels.min(MAX_CHANNELS)
}

/// Clamp a requested sample rate into the supported range.
#[inline]
pub fn clamp_sample_rate(sample_rate: f32) -> f32 {
    sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
}
