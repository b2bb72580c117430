//! Output device enumeration via cpal.

use crate::{Error, Result};
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

/// Fallback sample rate when a device does not report a default config.
const FALLBACK_SAMPLE_RATE: u32 = 48000;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Channel count of the default output config.
    pub default_channels: u16,
}

impl AudioDevice {
    fn from_cpal(device: &Device, name: String, is_default: bool) -> Self {
        let (default_sample_rate, default_channels) = device
            .default_output_config()
            .map(|c| (c.sample_rate(), c.channels()))
            .unwrap_or((FALLBACK_SAMPLE_RATE, 2));
        Self {
            name,
            is_default,
            default_sample_rate,
            default_channels,
        }
    }
}

/// List every output device on the default host.
///
/// Devices whose name cannot be read are skipped.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    let devices = outputs
        .filter_map(|device| {
            let name = device_name(&device).ok()?;
            let is_default = default_name.as_deref() == Some(name.as_str());
            Some(AudioDevice::from_cpal(&device, name, is_default))
        })
        .collect::<Vec<_>>();

    tracing::debug!(count = devices.len(), "enumerated output devices");
    Ok(devices)
}

/// The host's default output device, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        device_name(&d)
            .ok()
            .map(|name| AudioDevice::from_cpal(&d, name, true))
    }))
}
