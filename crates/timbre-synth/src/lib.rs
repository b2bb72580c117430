//! Timbre Synth - the monophonic synthesis voice
//!
//! Builds the timbre voice from the `timbre-core` primitives.
//!
//! # Core Components
//!
//! ## Oscillator
//!
//! - [`Oscillator`] - Band-limited oscillator (PolyBLEP / PolyBLAMP)
//! - [`OscillatorWaveform`] - Sine, Square, Saw, Triangle
//!
//! ```rust
//! use timbre_synth::{Oscillator, OscillatorWaveform};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_frequency(440.0);
//! osc.set_waveform(OscillatorWaveform::Square);
//!
//! let sample = osc.advance();
//! ```
//!
//! ## Envelope
//!
//! - [`AdsrEnvelope`] - Linear ADSR with sample-counted stage timing
//! - [`EnvelopeState`] - Stage tracking
//!
//! ## Voice
//!
//! - [`SynthVoice`] - Oscillator, DC blocker, envelope-swept resonant filter,
//!   amplitude envelope and optional distortion
//! - [`EnvelopeTarget`] - Selects the amplitude or filter envelope
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! timbre-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use timbre_synth::{EnvelopeTarget, OscillatorWaveform, SynthVoice};
//! use timbre_core::ClipType;
//!
//! let mut voice = SynthVoice::new(48000.0);
//! voice.set_waveform(OscillatorWaveform::Saw);
//! voice.set_adsr(EnvelopeTarget::Filter, 0.002, 0.2, 0.2, 0.1);
//! voice.set_filter_q(4.0);
//! voice.set_distortion_enabled(true);
//! voice.set_clip_type(ClipType::Exponential);
//!
//! voice.note_on(45);
//! let block: Vec<f32> = (0..256).map(|_| voice.process()).collect();
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod oscillator;
pub mod voice;

pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use oscillator::{Oscillator, OscillatorWaveform};
pub use voice::{EnvelopeTarget, SynthVoice, midi_to_freq};
