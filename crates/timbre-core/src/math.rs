//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`soft_clip`] - tanh saturation used as the engine's output safety stage
//! - [`flush_denormal`] - Keep recursive filter state out of the subnormal range
//! - [`sanitize_sample_rate`] - Replace unusable sample rates at construction

use libm::{expf, logf, tanhf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use timbre_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    expf(db * core::f32::consts::LN_10 / 20.0)
}

/// Convert linear gain to decibels.
///
/// Gains at or below zero map to -120 dB instead of -inf.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 1e-6 {
        return -120.0;
    }
    20.0 * logf(linear) / core::f32::consts::LN_10
}

/// Soft clip using hyperbolic tangent.
///
/// Smooth saturation that approaches ±1 asymptotically, so any finite
/// input lands strictly inside (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range begins. Used in the feedback paths of the
/// biquad and DC blocker, where signal decays indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Rate substituted for a non-positive or non-finite constructor argument.
pub const FALLBACK_SAMPLE_RATE: f32 = 48000.0;

/// Return `sample_rate` if it is finite and positive, else [`FALLBACK_SAMPLE_RATE`].
pub fn sanitize_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            requested = sample_rate,
            fallback = FALLBACK_SAMPLE_RATE,
            "unusable sample rate, using fallback"
        );
        FALLBACK_SAMPLE_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-3);
        assert!((linear_to_db(1.0)).abs() < 1e-6);
        assert!((linear_to_db(0.1) + 20.0).abs() < 1e-3);
        assert_eq!(linear_to_db(0.0), -120.0);
    }

    #[test]
    fn test_soft_clip_bounded() {
        for x in [-100.0, -3.0, -0.5, 0.0, 0.5, 3.0, 100.0] {
            let y = soft_clip(x);
            assert!((-1.0..=1.0).contains(&y), "soft_clip({x}) = {y}");
        }
        assert_eq!(soft_clip(0.0), 0.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
    }

    #[test]
    fn test_sanitize_sample_rate() {
        assert_eq!(sanitize_sample_rate(44100.0), 44100.0);
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(sanitize_sample_rate(bad), FALLBACK_SAMPLE_RATE);
        }
    }
}
