//! cpal-based audio backend implementation.
//!
//! [`CpalBackend`] wraps [cpal](https://crates.io/crates/cpal) for
//! cross-platform output: ALSA (Linux), CoreAudio (macOS), WASAPI (Windows).

use crate::backend::{AudioBackend, ErrorCallback, OutputCallback, OutputConfig, StreamHandle};
use crate::device::device_name;
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal-based audio backend holding the platform's default [`Host`].
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Find an output device by case-insensitive substring, or the default.
    fn find_output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => {
                let search_lower = search.to_lowercase();
                let devices = self
                    .host
                    .output_devices()
                    .map_err(|e| Error::Stream(e.to_string()))?;

                for device in devices {
                    if let Ok(dev_name) = device_name(&device)
                        && dev_name.to_lowercase().contains(search_lower.as_str())
                    {
                        return Ok(device);
                    }
                }
                Err(Error::DeviceNotFound(format!(
                    "no output device matching '{}'",
                    search
                )))
            }
            None => self.host.default_output_device().ok_or(Error::NoDevice),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::device::list_output_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        crate::device::default_output_device()
    }

    fn build_output_stream(
        &self,
        config: &OutputConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_output_device(config.device_name.as_deref())?;

        let default_format = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .sample_format();
        if default_format != cpal::SampleFormat::F32 {
            // cpal converts for most hosts; only note it
            tracing::debug!(format = ?default_format, "device default format is not f32");
        }

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::StreamConfigNotSupported => Error::UnsupportedFormat(
                    format!(
                        "{} Hz, {} channels, {} frames",
                        config.sample_rate, config.channels, config.buffer_size
                    ),
                ),
                other => Error::Stream(other.to_string()),
            })?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    /// Requested rate if any supported range covers it at the requested
    /// channel count, otherwise the device's default rate.
    fn actual_sample_rate(&self, config: &OutputConfig) -> u32 {
        let Ok(device) = self.find_output_device(config.device_name.as_deref()) else {
            return config.sample_rate;
        };

        let supported = device
            .supported_output_configs()
            .map(|mut ranges| {
                ranges.any(|range| {
                    range.channels() == config.channels
                        && range.min_sample_rate() <= config.sample_rate
                        && config.sample_rate <= range.max_sample_rate()
                })
            })
            .unwrap_or(false);

        if supported {
            return config.sample_rate;
        }

        let fallback = device
            .default_output_config()
            .map(|c| c.sample_rate())
            .unwrap_or(config.sample_rate);
        tracing::warn!(
            requested = config.sample_rate,
            actual = fallback,
            "requested sample rate not supported, using device default"
        );
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpal_backend_name() {
        let backend = CpalBackend::new();
        assert_eq!(backend.name(), "cpal");
    }

    #[test]
    fn test_cpal_backend_list_devices() {
        let backend = CpalBackend::new();
        // Device availability depends on the system; enumeration itself must not fail hard
        let _ = backend.list_devices();
    }

    #[test]
    fn test_default_output_config() {
        let config = OutputConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.channels, 2);
        assert!(config.device_name.is_none());
    }

    #[test]
    fn test_stream_handle_debug() {
        let handle = StreamHandle::new(42u32);
        let debug_str = format!("{:?}", handle);
        assert!(debug_str.contains("StreamHandle"));
    }
}
