//! Resonant two-pole filter with sanitizing setters.
//!
//! [`ResonantFilter`] wraps a [`Biquad`] and owns the parameter tuple
//! `(type, frequency, q, gain, sample_rate)` the coefficients are derived
//! from. Every setter that changes an effective parameter recomputes the
//! coefficients immediately, so the biquad always matches the most recently
//! set tuple. Setting a parameter to the value it already holds is a no-op,
//! which keeps a modulated cutoff cheap whenever the modulation source is
//! flat (sustain, idle envelope).
//!
//! ## Sanitization
//!
//! | Input | Result |
//! |-------|--------|
//! | frequency < 0 | clamped to 0 |
//! | frequency > Nyquist | clamped to `sample_rate / 2` |
//! | q < 0 | clamped to 0 |
//! | gain on a non-shelf type | ignored |
//! | gain <= 0 | clamped to [`ResonantFilter::MIN_GAIN`] |
//! | NaN | ignored |
//!
//! Each of these emits a `tracing` warning when the `tracing` feature is on.
//! None of them can fail.
//!
//! ## Stability
//!
//! The stored frequency and Q are the sanitized request. Coefficient design
//! keeps `w0` strictly inside (0, π) and Q above [`ResonantFilter::MIN_Q`],
//! so a frequency of exactly 0 or Nyquist, or a Q of 0, still produces poles
//! inside the unit circle and finite output.

use crate::biquad::{
    Biquad, bandpass_coefficients, high_shelf_coefficients, highpass_coefficients,
    low_shelf_coefficients, lowpass_coefficients, notch_coefficients, peak_coefficients,
};

/// Response type of a [`ResonantFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterType {
    /// Passes below the cutoff, resonant peak at the cutoff for Q > 0.707.
    #[default]
    LowPass,
    /// Passes above the cutoff.
    HighPass,
    /// Passes a band around the cutoff (0 dB peak).
    BandPass,
    /// Rejects a band around the cutoff.
    Notch,
    /// Resonant peak at the cutoff, unity elsewhere.
    Peak,
    /// Scales content below the cutoff by `gain²`.
    LowShelf,
    /// Scales content above the cutoff by `gain²`.
    HighShelf,
}

impl FilterType {
    /// All response types, in declaration order.
    pub const ALL: [FilterType; 7] = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::BandPass,
        FilterType::Notch,
        FilterType::Peak,
        FilterType::LowShelf,
        FilterType::HighShelf,
    ];

    /// Whether [`ResonantFilter::set_gain`] affects this type.
    pub fn uses_gain(self) -> bool {
        matches!(self, FilterType::LowShelf | FilterType::HighShelf)
    }
}

/// Biquad filter with per-type RBJ coefficients and sanitizing setters.
///
/// ## Parameters
/// - `frequency`: Cutoff / center in Hz (0 to `sample_rate / 2`, default 1000.0)
/// - `q`: Resonance (>= 0, default 0.707)
/// - `gain`: Shelf amplitude `A` (> 0, default 1.0), only settable on shelves
///
/// # Example
///
/// ```rust
/// use timbre_core::{FilterType, ResonantFilter};
///
/// let mut filter = ResonantFilter::new(FilterType::LowPass, 44100.0);
/// filter.set_frequency(30000.0);
/// assert_eq!(filter.frequency(), 22050.0);
///
/// filter.set_frequency(-10.0);
/// assert_eq!(filter.frequency(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ResonantFilter {
    biquad: Biquad,
    filter_type: FilterType,
    frequency: f32,
    q: f32,
    gain: f32,
    sample_rate: f32,
    /// Number of coefficient recomputations since construction
    coefficient_updates: u64,
}

impl ResonantFilter {
    /// Smallest Q used for coefficient design.
    pub const MIN_Q: f32 = 0.01;
    /// Smallest accepted shelf gain.
    pub const MIN_GAIN: f32 = 0.001;
    /// Lowest design frequency in Hz; a stored frequency of 0 designs here.
    const MIN_DESIGN_HZ: f32 = 10.0;
    /// Highest design frequency as a fraction of the sample rate.
    const MAX_DESIGN_RATIO: f32 = 0.4999;

    /// Create a filter of the given type with 1 kHz cutoff and Q = 0.707.
    ///
    /// A non-positive or non-finite `sample_rate` is replaced by
    /// [`FALLBACK_SAMPLE_RATE`](crate::FALLBACK_SAMPLE_RATE).
    pub fn new(filter_type: FilterType, sample_rate: f32) -> Self {
        let sample_rate = crate::math::sanitize_sample_rate(sample_rate);
        let mut filter = Self {
            biquad: Biquad::new(),
            filter_type,
            frequency: 1000.0_f32.min(sample_rate * 0.5),
            q: core::f32::consts::FRAC_1_SQRT_2,
            gain: 1.0,
            sample_rate,
            coefficient_updates: 0,
        };
        filter.update_coefficients();
        filter
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.biquad.process(input)
    }

    /// Set the cutoff / center frequency in Hz.
    ///
    /// Negative values clamp to 0 and values above Nyquist clamp to
    /// `sample_rate / 2`. Setting the current value does nothing.
    pub fn set_frequency(&mut self, hz: f32) {
        if hz.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("filter frequency is NaN, ignored");
            return;
        }

        let nyquist = self.nyquist();
        let clamped = if hz < 0.0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = hz, "negative filter frequency, clamped to 0 Hz");
            0.0
        } else if hz > nyquist {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = hz, nyquist, "filter frequency above Nyquist, clamped");
            nyquist
        } else {
            hz
        };

        if clamped == self.frequency {
            return;
        }
        self.frequency = clamped;
        self.update_coefficients();
    }

    /// Set the resonance. Negative values clamp to 0.
    pub fn set_q(&mut self, q: f32) {
        if q.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("filter Q is NaN, ignored");
            return;
        }

        let clamped = if q < 0.0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = q, "negative filter Q, clamped to 0");
            0.0
        } else {
            q
        };

        if clamped == self.q {
            return;
        }
        self.q = clamped;
        self.update_coefficients();
    }

    /// Set the shelf gain `A`.
    ///
    /// Only lowshelf and highshelf respond; other types ignore the call.
    pub fn set_gain(&mut self, gain: f32) {
        if !self.filter_type.uses_gain() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                filter_type = ?self.filter_type,
                "gain only applies to shelf filters, ignored"
            );
            return;
        }
        if gain.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("filter gain is NaN, ignored");
            return;
        }

        let clamped = if gain < Self::MIN_GAIN {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = gain, "filter gain below minimum, clamped");
            Self::MIN_GAIN
        } else {
            gain
        };

        if clamped == self.gain {
            return;
        }
        self.gain = clamped;
        self.update_coefficients();
    }

    /// Switch the response type. History is kept.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        if filter_type == self.filter_type {
            return;
        }
        self.filter_type = filter_type;
        self.update_coefficients();
    }

    /// Set the sample rate, re-clamping the frequency to the new Nyquist.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate || !(sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
        self.frequency = self.frequency.min(self.nyquist());
        self.update_coefficients();
    }

    /// Clear the two-sample history.
    pub fn reset(&mut self) {
        self.biquad.clear();
    }

    /// Effective (sanitized) frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Effective (sanitized) Q.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Current shelf gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Current response type.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Normalized coefficients `(b0, b1, b2, a1, a2)` currently in use.
    pub fn coefficients(&self) -> (f32, f32, f32, f32, f32) {
        self.biquad.coefficients()
    }

    /// How many times the coefficients have been recomputed.
    pub fn coefficient_updates(&self) -> u64 {
        self.coefficient_updates
    }

    #[inline]
    fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }

    fn update_coefficients(&mut self) {
        let fs = self.sample_rate;
        let f = self
            .frequency
            .clamp(Self::MIN_DESIGN_HZ.min(fs * 0.25), fs * Self::MAX_DESIGN_RATIO);
        let q = self.q.max(Self::MIN_Q);
        let gain = self.gain;

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::LowPass => lowpass_coefficients(f, q, fs),
            FilterType::HighPass => highpass_coefficients(f, q, fs),
            FilterType::BandPass => bandpass_coefficients(f, q, fs),
            FilterType::Notch => notch_coefficients(f, q, fs),
            FilterType::Peak => peak_coefficients(f, q, gain, fs),
            FilterType::LowShelf => low_shelf_coefficients(f, q, gain, fs),
            FilterType::HighShelf => high_shelf_coefficients(f, q, gain, fs),
        };
        self.biquad.set_coefficients(b0, b1, b2, a0, a1, a2);
        self.coefficient_updates += 1;
    }
}
