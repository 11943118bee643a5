//! Property-based tests over the dynamics stages.

use proptest::prelude::*;

use dinamica_dynamics::{
    Compressor, CompressorCurve, DownwardExpanderCurve, GainCurve, Gate, GateCurve, Limiter,
    LimiterCurve, UpwardExpander, UpwardExpanderCurve,
};

const SR: f32 = 48000.0;

fn prepared_compressor(threshold_db: f32, ratio: f32, knee_db: f32) -> Compressor {
    let mut comp = Compressor::new();
    comp.set_threshold_db(threshold_db, true);
    comp.set_ratio(ratio, true);
    comp.set_knee_db(knee_db, true);
    comp.prepare(1, SR);
    comp
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every curve maps any plausible operating point to a finite gain
    /// change, including degenerate knees and extreme ratios.
    #[test]
    fn curves_are_finite_everywhere(
        input_db in -200.0f32..40.0,
        threshold_db in -120.0f32..24.0,
        ratio in 1.0f32..100.0,
        knee_db in 0.0f32..48.0,
    ) {
        for g in [
            CompressorCurve::gain_change_db(input_db, threshold_db, ratio, knee_db),
            DownwardExpanderCurve::gain_change_db(input_db, threshold_db, ratio, knee_db),
            UpwardExpanderCurve::gain_change_db(input_db, threshold_db, ratio, knee_db),
            LimiterCurve::gain_change_db(input_db, threshold_db, ratio, knee_db),
            GateCurve::gain_change_db(input_db, threshold_db, ratio, knee_db),
        ] {
            prop_assert!(g.is_finite(), "non-finite gain change {}", g);
        }
    }

    /// Reduction-only curves never ask for gain above unity; the upward
    /// expander never asks for gain below it.
    #[test]
    fn curve_signs_match_their_policies(
        input_db in -200.0f32..40.0,
        threshold_db in -120.0f32..24.0,
        ratio in 1.0f32..100.0,
        knee_db in 0.0f32..48.0,
    ) {
        prop_assert!(CompressorCurve::gain_change_db(input_db, threshold_db, ratio, knee_db) <= 0.0);
        prop_assert!(DownwardExpanderCurve::gain_change_db(input_db, threshold_db, ratio, knee_db) <= 0.0);
        prop_assert!(LimiterCurve::gain_change_db(input_db, threshold_db, ratio, knee_db) <= 0.0);
        prop_assert!(GateCurve::gain_change_db(input_db, threshold_db, ratio, knee_db) <= 0.0);
        prop_assert!(UpwardExpanderCurve::gain_change_db(input_db, threshold_db, ratio, knee_db) >= 0.0);
    }

    /// Raising the ratio never shrinks the reduction above threshold.
    #[test]
    fn ratio_is_monotonic_in_reduction(
        input_db in -30.0f32..20.0,
        ratio in 1.0f32..50.0,
        extra in 0.0f32..50.0,
        knee_db in 0.0f32..24.0,
    ) {
        let gentle = CompressorCurve::gain_change_db(input_db, -20.0, ratio, knee_db);
        let firm = CompressorCurve::gain_change_db(input_db, -20.0, ratio + extra, knee_db);
        prop_assert!(firm <= gentle + 1e-5,
            "ratio {} reduced less than ratio {}: {} vs {}",
            ratio + extra, ratio, firm, gentle);
    }

    /// A compressor never amplifies: for any signal and any settings,
    /// |output| <= |input| sample by sample.
    #[test]
    fn compressor_never_amplifies(
        input in prop::collection::vec(-1.5f32..1.5, 512),
        threshold_db in -60.0f32..0.0,
        ratio in 1.0f32..20.0,
        knee_db in 0.0f32..24.0,
    ) {
        let mut comp = prepared_compressor(threshold_db, ratio, knee_db);
        for &x in &input {
            let y = comp.process_sample(0, x);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() <= x.abs() + 1e-6,
                "compressor amplified {} to {}", x, y);
        }
    }

    /// Limiter and gate share the never-amplify guarantee.
    #[test]
    fn reduction_stages_never_amplify(
        input in prop::collection::vec(-1.5f32..1.5, 256),
        threshold_db in -60.0f32..0.0,
    ) {
        let mut lim = Limiter::new();
        lim.set_threshold_db(threshold_db, true);
        lim.prepare(1, SR);

        let mut gate = Gate::new();
        gate.set_threshold_db(threshold_db, true);
        gate.prepare(1, SR);

        for &x in &input {
            prop_assert!(lim.process_sample(0, x).abs() <= x.abs() + 1e-6);
            prop_assert!(gate.process_sample(0, x).abs() <= x.abs() + 1e-6);
        }
    }

    /// An upward expander never attenuates.
    #[test]
    fn upward_expander_never_attenuates(
        input in prop::collection::vec(-1.0f32..1.0, 256),
        threshold_db in -60.0f32..0.0,
        ratio in 1.0f32..8.0,
    ) {
        let mut exp = UpwardExpander::new();
        exp.set_threshold_db(threshold_db, true);
        exp.set_ratio(ratio, true);
        exp.set_knee_db(0.0, true);
        exp.prepare(1, SR);

        for &x in &input {
            let y = exp.process_sample(0, x);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() >= x.abs() - 1e-6,
                "upward expander attenuated {} to {}", x, y);
        }
    }

    /// The block meter equals the deepest per-sample gain of that block.
    #[test]
    fn meter_matches_deepest_per_sample_gain(
        input in prop::collection::vec(0.05f32..1.2, 256),
        threshold_db in -40.0f32..-10.0,
    ) {
        let mut comp = prepared_compressor(threshold_db, 4.0, 6.0);
        let mut output = vec![0.0f32; input.len()];
        comp.process_block(&[&input], None, &mut [&mut output]);

        let min_gain = input.iter().zip(&output)
            .map(|(x, y)| y / x)
            .fold(f32::INFINITY, f32::min);
        let meter = comp.gain_reduction(0);
        prop_assert!((meter - min_gain).abs() < 1e-5,
            "meter {} vs per-sample minimum {}", meter, min_gain);
        prop_assert!(meter <= 1.0 + 1e-6);
    }

    /// Reset followed by the same signal reproduces the trajectory of a
    /// freshly prepared stage.
    #[test]
    fn stage_reset_is_idempotent(
        input in prop::collection::vec(-1.0f32..1.0, 256),
    ) {
        let mut fresh = prepared_compressor(-20.0, 4.0, 6.0);
        let mut reused = prepared_compressor(-20.0, 4.0, 6.0);

        for &x in &input {
            reused.process_sample(0, x);
        }
        reused.reset();

        for &x in &input {
            let a = fresh.process_sample(0, x);
            let b = reused.process_sample(0, x);
            prop_assert_eq!(a.to_bits(), b.to_bits(),
                "trajectories diverged: {} vs {}", a, b);
        }
    }
}
