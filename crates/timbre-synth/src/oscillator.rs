//! Audio-rate oscillator with anti-aliasing.
//!
//! Phase is kept in radians in `[0, 2π)`. The hard edges of square and saw
//! are smoothed with 2-sample PolyBLEP corrections; the triangle's corners
//! (slope discontinuities) use the integrated form, PolyBLAMP.

use core::f32::consts::TAU;
use libm::{fabsf, floorf, sinf};

/// Euclidean remainder for f32, compatible with no_std.
///
/// Guards the rounding case where `a - b*floor(a/b)` lands exactly on `b`.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 {
        r + b
    } else if r >= b {
        0.0
    } else {
        r
    }
}

/// Fractional part in `[0, 1)`.
#[inline]
fn wrap_unit(t: f32) -> f32 {
    rem_euclid_f32(t, 1.0)
}

/// Oscillator waveform types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OscillatorWaveform {
    /// Pure fundamental.
    #[default]
    Sine,
    /// 50% duty square, odd harmonics.
    Square,
    /// Rising ramp from -1 to 1, all harmonics.
    Saw,
    /// Folded ramp, odd harmonics falling at 12 dB/octave.
    Triangle,
}

impl OscillatorWaveform {
    /// All waveforms, in declaration order.
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Square,
        OscillatorWaveform::Saw,
        OscillatorWaveform::Triangle,
    ];
}

/// Audio-rate oscillator with PolyBLEP anti-aliasing.
///
/// # Example
///
/// ```rust
/// use timbre_synth::{Oscillator, OscillatorWaveform};
///
/// let mut osc = Oscillator::new(44100.0);
/// osc.set_frequency(440.0);
/// osc.set_waveform(OscillatorWaveform::Saw);
///
/// let sample = osc.advance();
/// assert!(sample.abs() <= 1.05);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase in radians, [0, 2π)
    phase: f32,
    /// Radians per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: OscillatorWaveform,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a 440 Hz sine oscillator at phase 0.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_inc: 0.0,
            sample_rate: timbre_core::sanitize_sample_rate(sample_rate),
            frequency: 440.0,
            waveform: OscillatorWaveform::Sine,
        };
        osc.update_increment();
        osc
    }

    /// Set frequency in Hz. Negative values become 0, NaN is ignored.
    ///
    /// A frequency of 0 holds the phase, producing a constant output.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        if freq_hz.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("oscillator frequency is NaN, ignored");
            return;
        }
        if freq_hz < 0.0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = freq_hz, "negative oscillator frequency, clamped to 0");
        }
        self.frequency = freq_hz.max(0.0);
        self.update_increment();
    }

    /// Get current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set waveform type.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    /// Get current waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Set sample rate and recalculate the phase increment.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /// Get current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Phase advance per sample in radians.
    pub fn phase_increment(&self) -> f32 {
        self.phase_inc
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Compute the sample at the current phase, then advance the phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = self.generate_sample();
        self.phase = rem_euclid_f32(self.phase + self.phase_inc, TAU);
        output
    }

    fn update_increment(&mut self) {
        self.phase_inc = if self.sample_rate > 0.0 {
            TAU * self.frequency / self.sample_rate
        } else {
            0.0
        };
    }

    /// Waveform at the current phase.
    ///
    /// - **Sine**: `sin(phase)`, no correction needed.
    /// - **Square**: naive ±1 with PolyBLEP at the rising edge (t = 0) and
    ///   the falling edge (t = 0.5).
    /// - **Saw**: naive ramp minus PolyBLEP at the wrap.
    /// - **Triangle**: `2|2t - 1| - 1` with PolyBLAMP at the peak (t = 0)
    ///   and the trough (t = 0.5). The slope changes by ∓8 per cycle there,
    ///   so the correction is scaled by `4·dt`.
    #[inline]
    fn generate_sample(&self) -> f32 {
        let mut t = self.phase / TAU;
        if t >= 1.0 {
            t = 0.0;
        }
        let dt = self.phase_inc / TAU;

        match self.waveform {
            OscillatorWaveform::Sine => sinf(self.phase),

            OscillatorWaveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep(wrap_unit(t + 0.5), dt)
            }

            OscillatorWaveform::Saw => {
                let naive = 2.0 * t - 1.0;
                naive - poly_blep(t, dt)
            }

            OscillatorWaveform::Triangle => {
                let naive = 2.0 * fabsf(2.0 * t - 1.0) - 1.0;
                naive - 4.0 * dt * (poly_blamp(t, dt) - poly_blamp(wrap_unit(t + 0.5), dt))
            }
        }
    }
}

/// 2nd-order PolyBLEP (Polynomial Band-Limited Step) residual.
///
/// Two samples wide: one after the discontinuity (`t < dt`) and one before
/// it (`t > 1 - dt`). The residual is for a step of height 2 (from -1 to
/// +1), so it ranges over [-1, 1].
///
/// # Arguments
/// * `t` - Normalized phase in [0.0, 1.0)
/// * `dt` - Normalized phase increment per sample
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let n = t / dt;
        2.0 * n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + 2.0 * n + 1.0
    } else {
        0.0
    }
}

/// 2nd-order PolyBLAMP residual, the running integral of [`poly_blep`].
///
/// Peaks at 1/3 on the corner itself and fades to 0 one sample away.
#[inline]
fn poly_blamp(t: f32, dt: f32) -> f32 {
    if t < dt {
        let x = t / dt - 1.0;
        -(x * x * x) / 3.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt + 1.0;
        x * x * x / 3.0
    } else {
        0.0
    }
}
