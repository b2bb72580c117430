//! WAV output for offline renders.

use crate::{Error, Result};
use hound::{SampleFormat, WavWriter};
use std::path::Path;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample. 32 writes IEEE float, anything else integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Write interleaved samples to a WAV file.
///
/// Integer formats scale by `2^(bits - 1)` and clamp to the representable
/// range. Bit depths other than 8, 16, 24 and 32 are rejected.
///
/// # Example
/// ```ignore
/// let samples = vec![0.0f32; 96000]; // 1 second of stereo silence
/// write_wav("silence.wav", &samples, WavSpec::default())?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, interleaved: &[f32], spec: WavSpec) -> Result<()> {
    let path = path.as_ref();
    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit WAV",
            spec.bits_per_sample
        )));
    }
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for &sample in interleaved {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for &sample in interleaved {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    tracing::debug!(
        path = %path.display(),
        samples = interleaved.len(),
        channels = spec.channels,
        "wav written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_format_for_32_bit() {
        let spec = hound::WavSpec::from(WavSpec::default());
        assert_eq!(spec.sample_format, SampleFormat::Float);
        let spec = hound::WavSpec::from(WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        });
        assert_eq!(spec.sample_format, SampleFormat::Int);
    }

    #[test]
    fn test_int_samples_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
        };
        write_wav(&path, &[2.0, -2.0, 0.5], spec).unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .into_samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![i16::MAX, i16::MIN, 16384]);
    }

    #[test]
    fn test_odd_bit_depth_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let spec = WavSpec {
            bits_per_sample: 12,
            ..WavSpec::default()
        };
        let result = write_wav(dir.path().join("odd.wav"), &[0.0], spec);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
