//! Static gain-computer curves: the policy family.
//!
//! A gain curve maps a detected level (dB) to a target gain change (dB),
//! parametrized by threshold, ratio, and knee width. One [`GainCurve`]
//! capability, five implementations:
//!
//! | Policy | Trigger | Effect | Ratio | Knee |
//! |--------|---------|--------|-------|------|
//! | [`CompressorCurve`] | above threshold | gain reduction | yes | yes |
//! | [`DownwardExpanderCurve`] | below threshold | gain reduction | yes | yes |
//! | [`UpwardExpanderCurve`] | above threshold | gain increase | yes | yes |
//! | [`LimiterCurve`] | above threshold | hard reduction to 0 dB over | no | no |
//! | [`GateCurve`] | below threshold | mute | no | no |
//!
//! Every curve is evaluated branchlessly: each region test is a 0/1 mask
//! multiplied into the result, so a call costs the same regardless of which
//! region the input falls in — sample-accurate, jitter-free real-time cost.
//!
//! The soft knee is a quadratic interpolation between the unity and
//! full-slope regions. Its divisor is `knee + ε` so a zero knee width can
//! never divide by zero while the knee masks settle; the curve itself is
//! continuous and slope-matched at `threshold ± knee/2`.

/// 0.0/1.0 mask from a region test.
#[inline]
fn mask(cond: bool) -> f32 {
    f32::from(cond)
}

/// Gain change reported by [`GateCurve`] below threshold (effectively mute).
pub const GATE_FLOOR_DB: f32 = -120.0;

/// Shared soft/hard-knee magnitude for the ratio-bearing curves.
///
/// `excess` is the signed distance into the triggered region (dB): positive
/// past the threshold in the curve's trigger direction. Returns the
/// *magnitude* of the gain change; the caller applies its sign.
#[inline]
fn knee_magnitude_db(excess: f32, ratio: f32, knee_db: f32) -> f32 {
    let half_knee = 0.5 * knee_db;
    let one_minus_inv_ratio = 1.0 - 1.0 / ratio;

    let has_knee = mask(knee_db > 0.0);
    let in_knee = mask(excess > -half_knee) * mask(excess < half_knee);
    let above_knee = mask(excess >= half_knee);

    // Epsilon guard only; never a behavioral knee.
    let safe_knee = knee_db + f32::EPSILON;
    let t = excess + half_knee;
    let soft = one_minus_inv_ratio * t * t / (2.0 * safe_knee);
    let hard = one_minus_inv_ratio * excess;

    has_knee * in_knee * soft + above_knee * hard
}

/// A static curve mapping detected level to target gain change, both in dB.
///
/// Implementations are zero-sized markers; parameters arrive per call so the
/// owning computer can feed sample-accurate smoothed values.
pub trait GainCurve {
    /// Whether the policy uses the ratio parameter.
    const HAS_RATIO: bool;
    /// Whether the policy uses the knee parameter.
    const HAS_KNEE: bool;

    /// Map a detected level to a gain change.
    ///
    /// `ratio` is assumed `>= 1` and `knee_db >= 0`; the computer's
    /// parameter bounds enforce this.
    fn gain_change_db(input_db: f32, threshold_db: f32, ratio: f32, knee_db: f32) -> f32;
}

/// Downward compressor: reduce gain above threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressorCurve;

impl GainCurve for CompressorCurve {
    const HAS_RATIO: bool = true;
    const HAS_KNEE: bool = true;

    #[inline]
    fn gain_change_db(input_db: f32, threshold_db: f32, ratio: f32, knee_db: f32) -> f32 {
        let over = input_db - threshold_db;
        -knee_magnitude_db(over, ratio, knee_db)
    }
}

/// Downward expander: reduce gain below threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownwardExpanderCurve;

impl GainCurve for DownwardExpanderCurve {
    const HAS_RATIO: bool = true;
    const HAS_KNEE: bool = true;

    #[inline]
    fn gain_change_db(input_db: f32, threshold_db: f32, ratio: f32, knee_db: f32) -> f32 {
        let under = threshold_db - input_db;
        -knee_magnitude_db(under, ratio, knee_db)
    }
}

/// Upward expander: increase gain above threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpwardExpanderCurve;

impl GainCurve for UpwardExpanderCurve {
    const HAS_RATIO: bool = true;
    const HAS_KNEE: bool = true;

    #[inline]
    fn gain_change_db(input_db: f32, threshold_db: f32, ratio: f32, knee_db: f32) -> f32 {
        let over = input_db - threshold_db;
        knee_magnitude_db(over, ratio, knee_db)
    }
}

/// Hard limiter: everything over the threshold is pulled back to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LimiterCurve;

impl GainCurve for LimiterCurve {
    const HAS_RATIO: bool = false;
    const HAS_KNEE: bool = false;

    #[inline]
    fn gain_change_db(input_db: f32, threshold_db: f32, _ratio: f32, _knee_db: f32) -> f32 {
        (threshold_db - input_db).min(0.0)
    }
}

/// Gate: mute below threshold, unity above.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateCurve;

impl GainCurve for GateCurve {
    const HAS_RATIO: bool = false;
    const HAS_KNEE: bool = false;

    #[inline]
    fn gain_change_db(input_db: f32, threshold_db: f32, _ratio: f32, _knee_db: f32) -> f32 {
        mask(input_db < threshold_db) * GATE_FLOOR_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressor_unity_below_knee() {
        let g = CompressorCurve::gain_change_db(-40.0, -20.0, 4.0, 6.0);
        assert_eq!(g, 0.0);
    }

    #[test]
    fn compressor_hard_knee_slope() {
        // 10 dB over threshold at 4:1 with no knee: reduce by 7.5 dB.
        let g = CompressorCurve::gain_change_db(-10.0, -20.0, 4.0, 0.0);
        assert!((g - (-7.5)).abs() < 1e-5, "got {g}");
    }

    #[test]
    fn compressor_worked_example_at_knee_edges() {
        // T=-20 dB, R=4, K=6 dB (spec of the curve family):
        // at -23 dB (lower knee edge) the gain change is ~0 dB;
        // at -17 dB (upper knee edge) it equals the hard-knee value
        // -(1 - 1/4) * 3 = -2.25 dB.
        let lower = CompressorCurve::gain_change_db(-23.0, -20.0, 4.0, 6.0);
        assert!(lower.abs() < 1e-5, "lower edge should be ~0, got {lower}");

        let upper = CompressorCurve::gain_change_db(-17.0, -20.0, 4.0, 6.0);
        assert!((upper - (-2.25)).abs() < 1e-4, "upper edge: got {upper}");
    }

    #[test]
    fn compressor_curve_is_continuous_across_knee() {
        let (t, r, k) = (-20.0, 4.0, 6.0);
        let step = 0.001;
        for edge in [t - k / 2.0, t + k / 2.0] {
            let below = CompressorCurve::gain_change_db(edge - step, t, r, k);
            let above = CompressorCurve::gain_change_db(edge + step, t, r, k);
            assert!(
                (below - above).abs() < 0.01,
                "discontinuity at {edge}: {below} vs {above}"
            );
        }
    }

    #[test]
    fn knee_slope_matches_hard_knee_at_the_edges() {
        // The quadratic knee is slope-matched where it hands over: slope 0
        // at the lower edge, the full hard-knee slope at the upper edge.
        let (t, r, k) = (-20.0, 4.0, 6.0);
        let h = 0.01;
        let slope_at = |x: f32| {
            (CompressorCurve::gain_change_db(x + h, t, r, k)
                - CompressorCurve::gain_change_db(x - h, t, r, k))
                / (2.0 * h)
        };

        let lower = slope_at(t - k / 2.0 + h);
        assert!(lower.abs() < 0.02, "lower-edge slope should be ~0, got {lower}");

        let upper = slope_at(t + k / 2.0 - h);
        let hard = -(1.0 - 1.0 / r);
        assert!(
            (upper - hard).abs() < 0.02,
            "upper-edge slope should be ~{hard}, got {upper}"
        );
    }

    #[test]
    fn zero_knee_does_not_divide_by_zero() {
        for db in [-60.0, -20.0, -19.999, 0.0, 20.0] {
            let g = CompressorCurve::gain_change_db(db, -20.0, 4.0, 0.0);
            assert!(g.is_finite(), "non-finite at {db} dB");
        }
    }

    #[test]
    fn downward_expander_reduces_below_threshold() {
        // 10 dB under threshold at 2:1 with no knee: reduce by 5 dB.
        let g = DownwardExpanderCurve::gain_change_db(-40.0, -30.0, 2.0, 0.0);
        assert!((g - (-5.0)).abs() < 1e-5, "got {g}");
        // Above threshold: untouched.
        let g = DownwardExpanderCurve::gain_change_db(-10.0, -30.0, 2.0, 0.0);
        assert_eq!(g, 0.0);
    }

    #[test]
    fn upward_expander_boosts_above_threshold() {
        let g = UpwardExpanderCurve::gain_change_db(-10.0, -20.0, 4.0, 0.0);
        assert!((g - 7.5).abs() < 1e-5, "got {g}");
        let g = UpwardExpanderCurve::gain_change_db(-30.0, -20.0, 4.0, 0.0);
        assert_eq!(g, 0.0);
    }

    #[test]
    fn limiter_pins_overshoot_to_threshold() {
        assert_eq!(LimiterCurve::gain_change_db(-3.0, -6.0, 1.0, 0.0), -3.0);
        assert_eq!(LimiterCurve::gain_change_db(-12.0, -6.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn gate_mutes_below_threshold() {
        assert_eq!(GateCurve::gain_change_db(-50.0, -40.0, 1.0, 0.0), GATE_FLOOR_DB);
        assert_eq!(GateCurve::gain_change_db(-30.0, -40.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn ratio_one_is_identity_for_ratio_curves() {
        for db in [-40.0, -20.0, -10.0, 0.0] {
            assert_eq!(CompressorCurve::gain_change_db(db, -20.0, 1.0, 6.0), 0.0);
            assert_eq!(DownwardExpanderCurve::gain_change_db(db, -20.0, 1.0, 6.0), 0.0);
            assert_eq!(UpwardExpanderCurve::gain_change_db(db, -20.0, 1.0, 6.0), 0.0);
        }
    }
}
