//! The audio engine: one voice, a command queue, and an output stage.

use crate::backend::{AudioBackend, OutputConfig, StreamHandle};
use crate::command::{EngineCommand, EngineHandle};
use crate::{EngineConfig, Result};
use rtrb::{Consumer, RingBuffer};
use timbre_core::soft_clip;
use timbre_synth::SynthVoice;

/// Owns the [`SynthVoice`] and fills interleaved output buffers.
///
/// Every buffer starts by draining the command queue, so parameter changes
/// land on buffer boundaries. After that the engine renders one mono sample
/// per frame, applies the output trim and a tanh soft clip, and copies the
/// result to every channel of the frame.
///
/// [`render`](Self::render) never allocates, locks or logs, so it is safe to
/// call from a device callback. [`start`](Self::start) does exactly that;
/// offline hosts call it directly.
///
/// # Example
///
/// ```rust
/// use timbre_io::{AudioEngine, EngineConfig};
///
/// let (mut engine, mut handle) = AudioEngine::new(EngineConfig::default()).unwrap();
/// handle.note_on(57).unwrap();
///
/// let mut buffer = vec![0.0f32; 512];
/// engine.render(&mut buffer);
/// assert!(buffer.iter().all(|s| s.abs() < 1.0));
/// assert_eq!(buffer[0], buffer[1]); // stereo frames carry the same sample
/// ```
pub struct AudioEngine {
    voice: SynthVoice,
    commands: Consumer<EngineCommand>,
    output_gain: f32,
    output: OutputConfig,
}

impl AudioEngine {
    /// Build an engine and the handle that controls it.
    pub fn new(config: EngineConfig) -> Result<(Self, EngineHandle)> {
        config.validate()?;
        let (producer, consumer) = RingBuffer::new(config.command_capacity);

        let engine = Self {
            voice: SynthVoice::new(config.sample_rate as f32),
            commands: consumer,
            output_gain: config.output_gain,
            output: OutputConfig::from(&config),
        };
        tracing::debug!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            capacity = config.command_capacity,
            "audio engine created"
        );
        Ok((engine, EngineHandle::new(producer)))
    }

    /// Fill an interleaved buffer.
    ///
    /// A trailing partial frame is filled like a full one.
    pub fn render(&mut self, out: &mut [f32]) {
        self.drain_commands();
        let channels = usize::from(self.output.channels);
        for frame in out.chunks_mut(channels) {
            let sample = soft_clip(self.voice.process() * self.output_gain);
            frame.fill(sample);
        }
    }

    /// Apply every queued command.
    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: EngineCommand) {
        let voice = &mut self.voice;
        match command {
            EngineCommand::NoteOn(note) => voice.note_on(note),
            EngineCommand::NoteOff => voice.note_off(),
            EngineCommand::SetFrequency(hz) => voice.set_frequency(hz),
            EngineCommand::SetFilterFrequencyBase(hz) => voice.set_filter_frequency_base(hz),
            EngineCommand::SetFilterBaseOffset(hz) => voice.set_filter_base_offset(hz),
            EngineCommand::SetFilterQ(q) => voice.set_filter_q(q),
            EngineCommand::SetFilterType(filter_type) => voice.set_filter_type(filter_type),
            EngineCommand::SetFilterGain(gain) => voice.set_filter_gain(gain),
            EngineCommand::SetAttackTime { target, secs } => voice.set_attack_time(target, secs),
            EngineCommand::SetDecayTime { target, secs } => voice.set_decay_time(target, secs),
            EngineCommand::SetSustainLevel { target, level } => {
                voice.set_sustain_level(target, level);
            }
            EngineCommand::SetReleaseTime { target, secs } => {
                voice.set_release_time(target, secs);
            }
            EngineCommand::SetAdsr {
                target,
                attack,
                decay,
                sustain,
                release,
            } => voice.set_adsr(target, attack, decay, sustain, release),
            EngineCommand::SetDistortionGain(gain) => voice.set_distortion_gain(gain),
            EngineCommand::SetDistortionEnabled(enabled) => voice.set_distortion_enabled(enabled),
            EngineCommand::SetClipType(clip_type) => voice.set_clip_type(clip_type),
            EngineCommand::SetWaveform(waveform) => voice.set_waveform(waveform),
            EngineCommand::SetVoiceGain(gain) => voice.set_gain(gain),
            EngineCommand::SetOutputGain(gain) => self.output_gain = gain,
        }
    }

    /// Open an output stream on `backend` and move the engine into its callback.
    ///
    /// If the backend cannot run at the configured rate, the voice is
    /// re-tuned to the rate it reports before the stream starts.
    pub fn start(mut self, backend: &dyn AudioBackend) -> Result<EngineStream> {
        let actual = backend.actual_sample_rate(&self.output);
        if actual != self.output.sample_rate {
            tracing::info!(
                requested = self.output.sample_rate,
                actual,
                "adopting device sample rate"
            );
            self.output.sample_rate = actual;
            self.voice.set_sample_rate(actual as f32);
        }

        let config = self.output.clone();
        let channels = config.channels;
        let handle = backend.build_output_stream(
            &config,
            Box::new(move |out: &mut [f32]| self.render(out)),
            Box::new(|message: &str| tracing::error!(message, "audio stream error")),
        )?;

        Ok(EngineStream {
            _handle: handle,
            backend: backend.name().to_string(),
            sample_rate: actual,
            channels,
        })
    }

    /// The voice being rendered.
    pub fn voice(&self) -> &SynthVoice {
        &self.voice
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u16 {
        self.output.channels
    }

    /// Linear trim applied before the soft clip.
    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }
}

/// A running output stream. Dropping it stops playback.
#[derive(Debug)]
pub struct EngineStream {
    _handle: StreamHandle,
    backend: String,
    sample_rate: u32,
    channels: u16,
}

impl EngineStream {
    /// Name of the backend driving the stream.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Sample rate the stream runs at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timbre_core::FilterType;
    use timbre_synth::{EnvelopeState, EnvelopeTarget};

    fn engine() -> (AudioEngine, EngineHandle) {
        AudioEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_silent_until_note_on() {
        let (mut engine, _handle) = engine();
        let mut buffer = [1.0f32; 64];
        engine.render(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_commands_applied_at_buffer_start() {
        let (mut engine, mut handle) = engine();
        handle.set_filter_type(FilterType::HighPass).unwrap();
        handle
            .set_attack_time(EnvelopeTarget::Amplitude, 0.5)
            .unwrap();
        assert_eq!(engine.voice().filter().filter_type(), FilterType::LowPass);

        engine.render(&mut [0.0; 2]);
        assert_eq!(engine.voice().filter().filter_type(), FilterType::HighPass);
        assert_eq!(engine.voice().envelope(EnvelopeTarget::Amplitude).attack(), 0.5);
    }

    #[test]
    fn test_note_on_and_off_reach_voice() {
        let (mut engine, mut handle) = engine();
        handle.note_on(69).unwrap();
        engine.render(&mut [0.0; 128]);
        assert!((engine.voice().frequency() - 440.0).abs() < 1e-3);
        assert_eq!(
            engine.voice().envelope(EnvelopeTarget::Amplitude).state(),
            EnvelopeState::Attack
        );

        handle.note_off().unwrap();
        engine.render(&mut [0.0; 2]);
        assert_eq!(
            engine.voice().envelope(EnvelopeTarget::Amplitude).state(),
            EnvelopeState::Release
        );
    }

    #[test]
    fn test_output_gain_command() {
        let (mut engine, mut handle) = engine();
        handle.set_output_gain(0.25).unwrap();
        engine.render(&mut [0.0f32; 0]);
        assert_eq!(engine.output_gain(), 0.25);
    }

    #[test]
    fn test_mono_and_odd_channel_counts() {
        for channels in [1u16, 3] {
            let config = EngineConfig {
                channels,
                ..EngineConfig::default()
            };
            let (mut engine, mut handle) = AudioEngine::new(config).unwrap();
            handle.note_on(60).unwrap();
            let mut buffer = vec![0.0f32; 300];
            engine.render(&mut buffer);
            for frame in buffer.chunks(usize::from(channels)) {
                assert!(frame.iter().all(|&s| s == frame[0]));
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            channels: 0,
            ..EngineConfig::default()
        };
        assert!(AudioEngine::new(config).is_err());
    }
}
