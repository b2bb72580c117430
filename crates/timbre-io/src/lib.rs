//! Audio I/O layer for timbre.
//!
//! This crate provides:
//!
//! - **Engine**: [`AudioEngine`] owns the [`SynthVoice`](timbre_synth::SynthVoice)
//!   and fills interleaved output buffers, either from a device callback or
//!   offline through [`AudioEngine::render`]
//! - **Control path**: [`EngineHandle`] queues [`EngineCommand`]s through a
//!   lock-free SPSC ring buffer that the audio thread drains once per buffer
//! - **Backends**: the [`AudioBackend`] trait with the cpal-based
//!   [`CpalBackend`], plus output device listing
//! - **Configuration**: [`EngineConfig`], loadable from TOML
//! - **WAV output**: [`write_wav`] for offline renders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use timbre_io::{AudioEngine, CpalBackend, EngineConfig};
//!
//! let (engine, handle) = AudioEngine::new(EngineConfig::default())?;
//! let stream = engine.start(&CpalBackend::new())?;
//!
//! handle.note_on(60)?;
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! handle.note_off()?;
//!
//! drop(stream); // stops playback
//! ```

pub mod backend;
mod command;
mod config;
pub mod cpal_backend;
mod device;
mod engine;
mod wav;

pub use backend::{AudioBackend, ErrorCallback, OutputCallback, OutputConfig, StreamHandle};
pub use command::{EngineCommand, EngineHandle};
pub use config::EngineConfig;
pub use cpal_backend::CpalBackend;
pub use device::{AudioDevice, default_output_device, list_output_devices};
pub use engine::{AudioEngine, EngineStream};
pub use wav::{WavSpec, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable engine configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The command queue to the audio thread is full.
    #[error("Command queue full")]
    QueueFull,
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
