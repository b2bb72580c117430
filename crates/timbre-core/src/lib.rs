//! Timbre Core - DSP primitives for a monophonic synthesis voice
//!
//! This crate provides the signal-processing leaves of the timbre voice,
//! designed for real-time audio with zero allocation in the audio path.
//!
//! # Filters
//!
//! - [`Biquad`] - Second-order IIR filter (Direct Form I)
//! - [`ResonantFilter`] - Biquad driven by RBJ cookbook coefficients with
//!   seven response types and sanitizing setters
//! - [`DcBlocker`] - One-pole high-pass removing DC offset
//!
//! ## Nonlinear
//!
//! - [`DistortionStage`] - Stateless waveshaper with three clip curves
//!
//! ## Utilities
//!
//! - Math functions: [`soft_clip`], [`flush_denormal`], [`db_to_linear`], etc.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! timbre-core = { version = "0.1", default-features = false }
//! ```
//!
//! Parameter diagnostics (clamped cutoff, ignored gain) are emitted through
//! `tracing` when the `tracing` feature is enabled.
//!
//! # Example
//!
//! ```rust
//! use timbre_core::{DcBlocker, FilterType, ResonantFilter};
//!
//! let mut blocker = DcBlocker::new();
//! let mut filter = ResonantFilter::new(FilterType::LowPass, 48000.0);
//! filter.set_frequency(1200.0);
//! filter.set_q(2.0);
//!
//! let sample = filter.process(blocker.process(0.5));
//! assert!(sample.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod dc_blocker;
pub mod distortion;
pub mod math;
pub mod resonant_filter;

// Re-export main types at crate root
pub use biquad::{
    Biquad, Coefficients, bandpass_coefficients, high_shelf_coefficients, highpass_coefficients,
    low_shelf_coefficients, lowpass_coefficients, notch_coefficients, peak_coefficients,
};
pub use dc_blocker::DcBlocker;
pub use distortion::{ClipType, DistortionStage};
pub use math::{
    FALLBACK_SAMPLE_RATE, db_to_linear, flush_denormal, linear_to_db, sanitize_sample_rate,
    soft_clip,
};
pub use resonant_filter::{FilterType, ResonantFilter};
