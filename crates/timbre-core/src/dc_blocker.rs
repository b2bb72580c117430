//! One-pole DC blocker.
//!
//! Transfer function: H(z) = (1 - z^-1) / (1 - R*z^-1)
//!
//! The voice runs the raw oscillator through this before the resonant
//! filter, so asymmetric waveforms (narrow pulses, BLEP residue) never feed
//! a DC offset into the filter's feedback path.

/// DC blocking filter using a first-order highpass.
///
/// The pole radius R is fixed at [`DcBlocker::COEFF`]. The -3 dB corner
/// sits at roughly `(1 - R) / (2 * pi) * f_s`, about 35 Hz at 44.1 kHz.
///
/// ## Example
///
/// ```rust
/// use timbre_core::DcBlocker;
///
/// let mut blocker = DcBlocker::new();
/// let mut out = 0.0;
/// for _ in 0..44100 {
///     out = blocker.process(0.25);
/// }
/// assert!(out.abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct DcBlocker {
    /// x[n-1]
    x_prev: f32,
    /// y[n-1]
    y_prev: f32,
}

impl DcBlocker {
    /// Pole radius R.
    pub const COEFF: f32 = 0.995;

    /// Create a blocker with zeroed history.
    pub fn new() -> Self {
        Self {
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    /// Process one sample: `y[n] = x[n] - x[n-1] + R * y[n-1]`.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = input - self.x_prev + Self::COEFF * self.y_prev;
        self.x_prev = input;
        self.y_prev = crate::math::flush_denormal(output);
        output
    }

    /// Zero the history.
    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn test_dc_blocker_removes_dc() {
        let mut blocker = DcBlocker::new();

        let mut output = 0.0;
        for _ in 0..48000 {
            output = blocker.process(1.0);
        }

        assert!(output.abs() < 1e-3, "DC should be removed, got {output}");
    }

    #[test]
    fn test_dc_blocker_first_sample_passes() {
        let mut blocker = DcBlocker::new();
        assert_eq!(blocker.process(0.7), 0.7);
    }

    #[test]
    fn test_dc_blocker_passes_ac() {
        let mut blocker = DcBlocker::new();
        let freq = 1000.0;
        let sample_rate = 48000.0;

        for i in 0..48000 {
            let t = i as f32 / sample_rate;
            blocker.process(libm::sinf(2.0 * PI * freq * t));
        }

        let mut max_output = 0.0f32;
        for i in 0..48 {
            let t = (48000 + i) as f32 / sample_rate;
            let output = blocker.process(libm::sinf(2.0 * PI * freq * t));
            max_output = max_output.max(output.abs());
        }

        assert!(max_output > 0.95, "1 kHz should pass, max was {max_output}");
    }

    #[test]
    fn test_dc_blocker_reset() {
        let mut blocker = DcBlocker::new();
        for _ in 0..1000 {
            blocker.process(1.0);
        }

        blocker.reset();

        assert_eq!(blocker.x_prev, 0.0);
        assert_eq!(blocker.y_prev, 0.0);
    }

    #[test]
    fn test_dc_blocker_impulse_decays_at_fixed_pole() {
        let mut blocker = DcBlocker::new();
        assert_eq!(blocker.process(1.0), 1.0);
        // y[1] = 0 - 1 + R * 1, then each later sample scales by R
        let mut expected = DcBlocker::COEFF - 1.0;
        for _ in 0..8 {
            let y = blocker.process(0.0);
            assert!((y - expected).abs() < 1e-7, "got {y}, expected {expected}");
            expected *= DcBlocker::COEFF;
        }
    }

    #[test]
    fn test_dc_blocker_finite_output() {
        let mut blocker = DcBlocker::new();
        for i in 0..10000 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            assert!(blocker.process(input).is_finite());
        }
    }
}
