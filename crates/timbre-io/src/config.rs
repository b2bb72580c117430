//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Device and engine settings.
///
/// ## Fields
///
/// - `sample_rate`: Requested sample rate in Hz (default: 48000)
/// - `buffer_size`: Frames per device callback (default: 256)
/// - `channels`: Output channel count; the mono voice is duplicated to all (default: 2)
/// - `device_name`: Output device substring match (uses default device if `None`)
/// - `output_gain`: Trim applied before the output soft clip (default: 0.8)
/// - `command_capacity`: Slots in the control-to-audio command queue (default: 256)
///
/// Missing TOML keys fall back to these defaults:
///
/// ```rust
/// use timbre_io::EngineConfig;
///
/// let config = EngineConfig::from_toml_str("sample_rate = 44100\nchannels = 1").unwrap();
/// assert_eq!(config.sample_rate, 44100);
/// assert_eq!(config.channels, 1);
/// assert_eq!(config.buffer_size, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per device callback.
    pub buffer_size: u32,
    /// Output channel count.
    pub channels: u16,
    /// Output device name filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Linear output trim.
    pub output_gain: f32,
    /// Command queue capacity.
    pub command_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            device_name: None,
            output_gain: 0.8,
            command_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(toml_str).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be greater than 0".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be greater than 0".into()));
        }
        if self.channels == 0 {
            return Err(Error::Config("channels must be greater than 0".into()));
        }
        if self.command_capacity == 0 {
            return Err(Error::Config("command_capacity must be greater than 0".into()));
        }
        if !self.output_gain.is_finite() || self.output_gain < 0.0 {
            return Err(Error::Config(format!(
                "output_gain must be a non-negative number, got {}",
                self.output_gain
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.channels, 2);
        assert!(config.device_name.is_none());
        assert_eq!(config.output_gain, 0.8);
        assert_eq!(config.command_capacity, 256);
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig {
            sample_rate: 44100,
            device_name: Some("USB".into()),
            output_gain: 0.5,
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_fields() {
        for doc in [
            "sample_rate = 0",
            "buffer_size = 0",
            "channels = 0",
            "command_capacity = 0",
        ] {
            let err = EngineConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn test_rejects_negative_gain() {
        let err = EngineConfig::from_toml_str("output_gain = -1.0").unwrap_err();
        assert!(err.to_string().contains("output_gain"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("sample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
