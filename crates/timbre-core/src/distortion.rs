//! Stateless waveshaping distortion.
//!
//! [`DistortionStage`] drives the input by `gain`, bends it through one of
//! three odd-symmetric curves and divides the gain back out:
//!
//! ```text
//! y = shape(x * gain) / gain
//! ```
//!
//! Dividing by the drive keeps the small-signal slope independent of `gain`,
//! so raising it changes how early the curve bends rather than how loud the
//! stage is. That slope is 1 for [`ClipType::Tanh`] and
//! [`ClipType::Exponential`] and 2 for [`ClipType::Diode`].

use libm::{copysignf, expf, fabsf, tanhf};

/// Clipping curve used by a [`DistortionStage`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipType {
    /// `tanh(v)`.
    #[default]
    Tanh,
    /// `sign(v) * (1 - exp(-|v|))`, saturating toward ±1.
    Exponential,
    /// Three-segment piecewise curve that hard-clamps at `threshold`.
    Diode,
}

impl ClipType {
    /// All clip curves, in declaration order.
    pub const ALL: [ClipType; 3] = [ClipType::Tanh, ClipType::Exponential, ClipType::Diode];

    /// Apply the curve to an already-driven sample.
    ///
    /// `threshold` only affects [`ClipType::Diode`]. Every curve satisfies
    /// `shape(-v) == -shape(v)`.
    #[inline]
    pub fn shape(self, v: f32, threshold: f32) -> f32 {
        match self {
            ClipType::Tanh => tanhf(v),
            ClipType::Exponential => copysignf(1.0 - expf(-fabsf(v)), v),
            ClipType::Diode => diode(v, threshold),
        }
    }
}

/// Piecewise diode curve.
///
/// With `a = |v| / threshold`: slope 2 below 1/3, a downward parabola up to
/// 2/3, then flat at 1. The result is rescaled by `threshold` and given the
/// sign of `v`.
#[inline]
fn diode(v: f32, threshold: f32) -> f32 {
    let a = fabsf(v) / threshold;
    let shaped = if a < 1.0 / 3.0 {
        2.0 * a
    } else if a < 2.0 / 3.0 {
        let t = 2.0 - 3.0 * a;
        (3.0 - t * t) / 3.0
    } else {
        1.0
    };
    copysignf(shaped * threshold, v)
}

/// Per-sample waveshaper with selectable curve.
///
/// ## Parameters
/// - `gain`: Drive (> 0, default 1.0)
/// - `clip_type`: Curve (default [`ClipType::Tanh`])
/// - `threshold`: Diode clamp level (> 0, default 1.0)
///
/// # Example
///
/// ```rust
/// use timbre_core::{ClipType, DistortionStage};
///
/// let mut dist = DistortionStage::new(ClipType::Diode);
/// dist.set_gain(4.0);
/// // |0.5 * 4| >= 2/3, so the diode clamps and the stage returns 1/gain
/// assert_eq!(dist.process(0.5), 0.25);
/// assert_eq!(dist.process(-0.5), -0.25);
/// ```
#[derive(Debug, Clone)]
pub struct DistortionStage {
    gain: f32,
    clip_type: ClipType,
    threshold: f32,
}

impl DistortionStage {
    /// Smallest accepted drive.
    pub const MIN_GAIN: f32 = 1.0e-3;
    /// Smallest accepted diode threshold.
    pub const MIN_THRESHOLD: f32 = 1.0e-3;

    /// Create a stage with unity drive and threshold.
    pub fn new(clip_type: ClipType) -> Self {
        Self {
            gain: 1.0,
            clip_type,
            threshold: 1.0,
        }
    }

    /// Shape one sample.
    #[inline]
    pub fn process(&self, input: f32) -> f32 {
        self.clip_type.shape(input * self.gain, self.threshold) / self.gain
    }

    /// Set the drive. Values below [`Self::MIN_GAIN`] are raised to it.
    pub fn set_gain(&mut self, gain: f32) {
        if gain.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("distortion gain is NaN, ignored");
            return;
        }
        if gain < Self::MIN_GAIN {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = gain, "distortion gain must be positive, clamped");
            self.gain = Self::MIN_GAIN;
        } else {
            self.gain = gain;
        }
    }

    /// Select the clip curve.
    pub fn set_clip_type(&mut self, clip_type: ClipType) {
        self.clip_type = clip_type;
    }

    /// Set the diode threshold. Values below [`Self::MIN_THRESHOLD`] are raised to it.
    pub fn set_threshold(&mut self, threshold: f32) {
        if threshold.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("diode threshold is NaN, ignored");
            return;
        }
        if threshold < Self::MIN_THRESHOLD {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = threshold, "diode threshold must be positive, clamped");
        }
        self.threshold = threshold.max(Self::MIN_THRESHOLD);
    }

    /// Current drive.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Current clip curve.
    pub fn clip_type(&self) -> ClipType {
        self.clip_type
    }

    /// Current diode threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for DistortionStage {
    fn default() -> Self {
        Self::new(ClipType::default())
    }
}
