//! Property-based tests for timbre-core DSP primitives.
//!
//! Filter stability under arbitrary modulation, and the symmetry and clamp
//! guarantees of the distortion curves.

use proptest::prelude::*;
use timbre_core::{ClipType, DcBlocker, DistortionStage, FilterType, ResonantFilter};

fn filter_type(index: usize) -> FilterType {
    FilterType::ALL[index % FilterType::ALL.len()]
}

fn clip_type(index: usize) -> ClipType {
    ClipType::ALL[index % ClipType::ALL.len()]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any type, any requested frequency (including negative and above
    /// Nyquist) and any non-negative Q yields finite output for bounded input.
    #[test]
    fn resonant_filter_stability(
        variant in 0usize..7,
        freq in -1000.0f32..40000.0f32,
        q in 0.0f32..20.0f32,
        gain in 0.1f32..4.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut filter = ResonantFilter::new(filter_type(variant), 44100.0);
        filter.set_gain(gain);
        filter.set_frequency(freq);
        filter.set_q(q);

        prop_assert!(filter.frequency() >= 0.0 && filter.frequency() <= 22050.0);

        for _ in 0..32 {
            for &sample in &input {
                let out = filter.process(sample);
                prop_assert!(
                    out.is_finite(),
                    "{:?} freq={} q={} produced {}",
                    filter.filter_type(), freq, q, out
                );
            }
        }
    }

    /// Re-setting the cutoff every sample, as the filter envelope does,
    /// never drives the filter unstable.
    #[test]
    fn resonant_filter_modulated_cutoff(
        variant in 0usize..7,
        cutoffs in prop::collection::vec(0.0f32..22050.0f32, 256),
        q in 0.1f32..8.0f32,
    ) {
        let mut filter = ResonantFilter::new(filter_type(variant), 44100.0);
        filter.set_q(q);

        for (i, &cutoff) in cutoffs.iter().enumerate() {
            filter.set_frequency(cutoff);
            let x = if (i / 16) % 2 == 0 { 0.8 } else { -0.8 };
            let out = filter.process(x);
            prop_assert!(out.is_finite() && out.abs() < 1.0e4, "cutoff {} gave {}", cutoff, out);
        }
    }

    /// Every clip curve is odd-symmetric.
    #[test]
    fn clip_curves_odd_symmetric(
        variant in 0usize..3,
        v in -100.0f32..100.0f32,
        threshold in 0.01f32..4.0f32,
    ) {
        let clip = clip_type(variant);
        prop_assert_eq!(clip.shape(-v, threshold), -clip.shape(v, threshold));
    }

    /// The diode output magnitude equals the threshold once the driven input
    /// reaches two thirds of it, and never exceeds it anywhere.
    #[test]
    fn diode_clamps_at_threshold(
        x in -10.0f32..10.0f32,
        gain in 0.1f32..20.0f32,
        threshold in 0.05f32..2.0f32,
    ) {
        let v = x * gain;
        let y = ClipType::Diode.shape(v, threshold);
        prop_assert!(y.abs() <= threshold * (1.0 + 1e-6));
        if v.abs() >= threshold * (2.0 / 3.0) * 1.0001 {
            prop_assert!((y.abs() - threshold).abs() <= threshold * 1e-6);
        }
    }

    /// Tanh and exponential stages stay within ±1/gain.
    #[test]
    fn saturating_stage_bounded(
        variant in 0usize..2,
        x in -50.0f32..50.0f32,
        gain in 0.01f32..50.0f32,
    ) {
        let mut stage = DistortionStage::new(clip_type(variant));
        stage.set_gain(gain);
        let y = stage.process(x);
        prop_assert!(y.is_finite());
        prop_assert!(y.abs() * gain <= 1.0 + 1e-5);
    }

    /// The DC blocker is stable for arbitrary bounded input.
    #[test]
    fn dc_blocker_bounded(input in prop::collection::vec(-1.0f32..=1.0f32, 2048)) {
        let mut blocker = DcBlocker::new();
        for &sample in &input {
            let out = blocker.process(sample);
            // |y| <= 2 / (1 - R) for |x| <= 1
            prop_assert!(out.is_finite() && out.abs() <= 400.0);
        }
    }
}
