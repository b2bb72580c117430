//! Second-order IIR section and RBJ coefficient design.
//!
//! Provides a generic second-order IIR filter plus the coefficient
//! functions for the seven response types used by
//! [`ResonantFilter`](crate::ResonantFilter).
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas with
//! `w0 = 2π·f/fs` and `alpha = sin(w0)/(2Q)`.

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf};

use crate::math::flush_denormal;

/// Unnormalized coefficient set `(b0, b1, b2, a0, a1, a2)`.
///
/// `b*` are feedforward, `a*` feedback. [`Biquad::set_coefficients`]
/// divides everything by `a0`.
pub type Coefficients = (f32, f32, f32, f32, f32, f32);

/// Two-pole, two-zero filter section in Direct Form I:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    // numerator, normalized
    b0: f32,
    b1: f32,
    b2: f32,

    // denominator, normalized (a0 == 1)
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,

    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Identity section (`b0 = 1`, everything else 0) with empty history.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    ///
    /// History is left untouched so coefficients can be swapped every
    /// sample while a modulated filter is running.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Returns the normalized coefficients `(b0, b1, b2, a1, a2)`.
    pub fn coefficients(&self) -> (f32, f32, f32, f32, f32) {
        (self.b0, self.b1, self.b2, self.a1, self.a2)
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);

        output
    }

    /// Zero the history, keeping the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared `(cos w0, alpha)` prelude of every cookbook formula.
#[inline]
fn omega_alpha(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q))
}

/// Second-order low-pass. `q = 1/sqrt(2)` gives a Butterworth corner,
/// -3 dB at `frequency`.
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Second-order high-pass, the spectral mirror of [`lowpass_coefficients`].
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Band-pass with unity gain at the center frequency regardless of `q`.
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);

    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Band-reject: a zero pair on the unit circle at `frequency`.
pub fn notch_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);

    let b0 = 1.0;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Resonant peak.
///
/// The numerator bandwidth is scaled by `gain` and the denominator
/// bandwidth by `1/q`, so the response at the center frequency is
/// `gain * q` and unity far from it.
///
/// `q` must be positive.
pub fn peak_coefficients(frequency: f32, q: f32, gain: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);

    let b0 = 1.0 + alpha * gain;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0 - alpha * gain;
    let a0 = 1.0 + alpha / q;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha / q;

    (b0, b1, b2, a0, a1, a2)
}

/// Low shelf.
///
/// `gain` is the cookbook's amplitude parameter `A`: DC is scaled by
/// `gain²` while Nyquist stays at unity. The slope term is
/// `sqrt(2·gain)·alpha`.
pub fn low_shelf_coefficients(frequency: f32, q: f32, gain: f32, sample_rate: f32) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);
    let a = gain;
    let beta = sqrtf(2.0 * a) * alpha;

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos_omega + beta);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos_omega - beta);
    let a0 = (a + 1.0) + (a - 1.0) * cos_omega + beta;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega);
    let a2 = (a + 1.0) + (a - 1.0) * cos_omega - beta;

    (b0, b1, b2, a0, a1, a2)
}

/// High shelf.
///
/// Mirror of [`low_shelf_coefficients`]: Nyquist is scaled by `gain²`
/// while DC stays at unity.
pub fn high_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain: f32,
    sample_rate: f32,
) -> Coefficients {
    let (cos_omega, alpha) = omega_alpha(frequency, q, sample_rate);
    let a = gain;
    let beta = sqrtf(2.0 * a) * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_omega + beta);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_omega - beta);
    let a0 = (a + 1.0) - (a - 1.0) * cos_omega + beta;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_omega);
    let a2 = (a + 1.0) - (a - 1.0) * cos_omega - beta;

    (b0, b1, b2, a0, a1, a2)
}
