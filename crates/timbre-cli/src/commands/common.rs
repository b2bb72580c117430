//! Engine and voice options shared by `play` and `render`.

use crate::pattern::Pattern;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use timbre_core::{ClipType, FilterType};
use timbre_io::{EngineConfig, EngineHandle};
use timbre_synth::{EnvelopeTarget, OscillatorWaveform};

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Square,
    #[default]
    Saw,
    Triangle,
}

impl From<CliWaveform> for OscillatorWaveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => OscillatorWaveform::Sine,
            CliWaveform::Square => OscillatorWaveform::Square,
            CliWaveform::Saw => OscillatorWaveform::Saw,
            CliWaveform::Triangle => OscillatorWaveform::Triangle,
        }
    }
}

/// Filter types for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliFilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
    Peak,
    Lowshelf,
    Highshelf,
}

impl From<CliFilterType> for FilterType {
    fn from(f: CliFilterType) -> Self {
        match f {
            CliFilterType::Lowpass => FilterType::LowPass,
            CliFilterType::Highpass => FilterType::HighPass,
            CliFilterType::Bandpass => FilterType::BandPass,
            CliFilterType::Notch => FilterType::Notch,
            CliFilterType::Peak => FilterType::Peak,
            CliFilterType::Lowshelf => FilterType::LowShelf,
            CliFilterType::Highshelf => FilterType::HighShelf,
        }
    }
}

/// Clip curves for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliClipType {
    Tanh,
    Exponential,
    Diode,
}

impl From<CliClipType> for ClipType {
    fn from(c: CliClipType) -> Self {
        match c {
            CliClipType::Tanh => ClipType::Tanh,
            CliClipType::Exponential => ClipType::Exponential,
            CliClipType::Diode => ClipType::Diode,
        }
    }
}

/// Device and engine settings. Flags override the config file.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Engine config file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Buffer size in frames
    #[arg(long)]
    pub buffer_size: Option<u32>,

    /// Output channel count
    #[arg(long)]
    pub channels: Option<u16>,

    /// Output trim before the soft clip
    #[arg(long)]
    pub output_gain: Option<f32>,
}

impl EngineArgs {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
            None => EngineConfig::default(),
        };

        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(size) = self.buffer_size {
            config.buffer_size = size;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(gain) = self.output_gain {
            config.output_gain = gain;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Step pattern settings.
#[derive(Args, Debug)]
pub struct PatternArgs {
    /// Comma-separated MIDI notes, '-' for a rest
    #[arg(short, long, default_value = "60,63,-,67")]
    pub pattern: String,

    /// Tempo in beats per minute (one step = one sixteenth)
    #[arg(long, default_value = "120")]
    pub bpm: f64,

    /// Fraction of each step the note is held (0-1]
    #[arg(long, default_value = "0.5")]
    pub gate: f64,
}

impl PatternArgs {
    /// Parse into a [`Pattern`].
    pub fn pattern(&self) -> anyhow::Result<Pattern> {
        Ok(Pattern::parse(&self.pattern, self.bpm, self.gate)?)
    }
}

/// Voice patch.
#[derive(Args, Debug)]
pub struct VoiceArgs {
    /// Oscillator waveform
    #[arg(short, long, value_enum, default_value_t)]
    pub waveform: CliWaveform,

    /// Filter response
    #[arg(long, value_enum, default_value_t)]
    pub filter: CliFilterType,

    /// Filter cutoff with the filter envelope closed, in Hz
    #[arg(long, default_value = "100")]
    pub cutoff: f32,

    /// Filter envelope depth in Hz
    #[arg(long, default_value = "2500")]
    pub env_depth: f32,

    /// Filter resonance
    #[arg(short, long, default_value = "2.0")]
    pub q: f32,

    /// Shelf gain (lowshelf / highshelf only)
    #[arg(long)]
    pub shelf_gain: Option<f32>,

    /// Amplitude attack in seconds
    #[arg(long, default_value = "0.01")]
    pub attack: f32,

    /// Amplitude decay in seconds
    #[arg(long, default_value = "0.1")]
    pub decay: f32,

    /// Amplitude sustain level (0-1)
    #[arg(long, default_value = "0.7")]
    pub sustain: f32,

    /// Amplitude release in seconds
    #[arg(long, default_value = "0.2")]
    pub release: f32,

    /// Enable distortion with this clip curve
    #[arg(long, value_enum)]
    pub distortion: Option<CliClipType>,

    /// Distortion drive
    #[arg(long, default_value = "1.0")]
    pub drive: f32,

    /// Voice output trim
    #[arg(long, default_value = "0.5")]
    pub voice_gain: f32,
}

impl VoiceArgs {
    /// Queue the patch on `handle`. Lands on the engine's next buffer.
    pub fn apply(&self, handle: &mut EngineHandle) -> anyhow::Result<()> {
        handle.set_waveform(self.waveform.into())?;
        handle.set_filter_type(self.filter.into())?;
        handle.set_filter_base_offset(self.cutoff)?;
        handle.set_filter_frequency_base(self.env_depth)?;
        handle.set_filter_q(self.q)?;
        if let Some(gain) = self.shelf_gain {
            handle.set_filter_gain(gain)?;
        }
        handle.set_adsr(
            EnvelopeTarget::Amplitude,
            self.attack,
            self.decay,
            self.sustain,
            self.release,
        )?;
        if let Some(clip) = self.distortion {
            handle.set_clip_type(clip.into())?;
            handle.set_distortion_gain(self.drive)?;
            handle.set_distortion_enabled(true)?;
        }
        handle.set_voice_gain(self.voice_gain)?;
        Ok(())
    }

    /// Time the voice needs to fall silent after the last note-off.
    pub fn release_tail(&self) -> std::time::Duration {
        if self.release.is_finite() && self.release > 0.0 {
            std::time::Duration::from_secs_f32(self.release)
        } else {
            std::time::Duration::ZERO
        }
    }
}
