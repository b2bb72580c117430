//! Output backend trait for the engine.
//!
//! [`AudioBackend`] decouples the engine from any specific platform audio
//! API. [`CpalBackend`](crate::CpalBackend) is the default; tests and
//! headless hosts can supply their own implementation and drive the output
//! callback themselves.
//!
//! The trait uses boxed closures for callbacks rather than generic
//! parameters, so it is object-safe and a backend can be picked at runtime.
//! Streams come back as a type-erased [`StreamHandle`] that stops playback
//! on drop.

use crate::{AudioDevice, EngineConfig, Result};

/// What the engine asks a backend to open.
///
/// Built from an [`EngineConfig`]; the defaults match
/// `EngineConfig::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Sample rate in Hz. Backends may run at a different rate; see
    /// [`AudioBackend::actual_sample_rate`].
    pub sample_rate: u32,
    /// Frames per callback.
    pub buffer_size: u32,
    /// Number of output channels.
    pub channels: u16,
    /// Device name substring, or the host default when `None`.
    pub device_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for OutputConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
            channels: config.channels,
            device_name: config.device_name.clone(),
        }
    }
}

/// Keeps a backend's stream object alive. Dropping it stops playback.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time audio thread and must fill the interleaved buffer
/// (`[L0, R0, L1, R1, ...]` for stereo). It must not allocate, lock or
/// perform I/O.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Error callback, given a human-readable message.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable output backend.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g., "cpal").
    fn name(&self) -> &str;

    /// List the output devices this backend can open.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive. Dropping it stops
    /// playback. Device or format failures are returned here, before any
    /// audio runs.
    fn build_output_stream(
        &self,
        config: &OutputConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// The sample rate the backend will actually run at for `config`.
    ///
    /// Default implementation returns the requested rate unchanged.
    fn actual_sample_rate(&self, config: &OutputConfig) -> u32 {
        config.sample_rate
    }
}
