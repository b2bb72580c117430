//! Control-to-audio command queue.
//!
//! The control thread owns an [`EngineHandle`]; the audio thread owns the
//! consuming end inside [`AudioEngine`](crate::AudioEngine). Commands are
//! sanitized and logged on the control side, so applying them on the audio
//! thread never clamps, warns or allocates.

use crate::{Error, Result};
use rtrb::{Producer, PushError};
use timbre_core::{ClipType, DistortionStage, FilterType};
use timbre_synth::{EnvelopeTarget, OscillatorWaveform};

/// A parameter change or trigger for the audio thread.
///
/// Each variant maps to one [`SynthVoice`](timbre_synth::SynthVoice) setter
/// (or, for `SetOutputGain`, to the engine's output trim). Last writer wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Tune to a MIDI note and trigger both envelopes.
    NoteOn(u8),
    /// Release both envelopes.
    NoteOff,
    /// Direct oscillator frequency in Hz.
    SetFrequency(f32),
    /// Filter envelope depth in Hz.
    SetFilterFrequencyBase(f32),
    /// Filter cutoff with the envelope at zero, in Hz.
    SetFilterBaseOffset(f32),
    /// Filter resonance.
    SetFilterQ(f32),
    /// Filter response type.
    SetFilterType(FilterType),
    /// Shelf gain for lowshelf / highshelf.
    SetFilterGain(f32),
    /// Attack time of one envelope, in seconds.
    SetAttackTime {
        /// Envelope to change.
        target: EnvelopeTarget,
        /// Seconds.
        secs: f32,
    },
    /// Decay time of one envelope, in seconds.
    SetDecayTime {
        /// Envelope to change.
        target: EnvelopeTarget,
        /// Seconds.
        secs: f32,
    },
    /// Sustain level of one envelope.
    SetSustainLevel {
        /// Envelope to change.
        target: EnvelopeTarget,
        /// Level in [0, 1].
        level: f32,
    },
    /// Release time of one envelope, in seconds.
    SetReleaseTime {
        /// Envelope to change.
        target: EnvelopeTarget,
        /// Seconds.
        secs: f32,
    },
    /// All four ADSR parameters of one envelope.
    SetAdsr {
        /// Envelope to change.
        target: EnvelopeTarget,
        /// Attack seconds.
        attack: f32,
        /// Decay seconds.
        decay: f32,
        /// Sustain level.
        sustain: f32,
        /// Release seconds.
        release: f32,
    },
    /// Distortion drive.
    SetDistortionGain(f32),
    /// Distortion stage in or out of the chain.
    SetDistortionEnabled(bool),
    /// Distortion curve.
    SetClipType(ClipType),
    /// Oscillator waveform.
    SetWaveform(OscillatorWaveform),
    /// Voice output trim.
    SetVoiceGain(f32),
    /// Engine output trim before the soft clip.
    SetOutputGain(f32),
}

/// Control-side handle to a running (or offline) [`AudioEngine`](crate::AudioEngine).
///
/// Every setter sanitizes its argument, logs anything it had to change, and
/// queues a command. Enqueueing never blocks; a full queue returns
/// [`Error::QueueFull`] and the caller decides whether to retry.
pub struct EngineHandle {
    producer: Producer<EngineCommand>,
    /// Filter type most recently sent, for rejecting non-shelf gain early
    filter_type: FilterType,
}

impl EngineHandle {
    pub(crate) fn new(producer: Producer<EngineCommand>) -> Self {
        Self {
            producer,
            filter_type: FilterType::LowPass,
        }
    }

    /// Trigger a note. Notes above 127 are clamped.
    pub fn note_on(&mut self, note: u8) -> Result<()> {
        let note = if note > 127 {
            tracing::warn!(note, "MIDI note above 127, clamped");
            127
        } else {
            note
        };
        self.send(EngineCommand::NoteOn(note))
    }

    /// Release the current note.
    pub fn note_off(&mut self) -> Result<()> {
        self.send(EngineCommand::NoteOff)
    }

    /// Override the oscillator frequency in Hz.
    pub fn set_frequency(&mut self, hz: f32) -> Result<()> {
        match non_negative("frequency", hz) {
            Some(hz) => self.send(EngineCommand::SetFrequency(hz)),
            None => Ok(()),
        }
    }

    /// Set the filter envelope depth in Hz.
    pub fn set_filter_frequency_base(&mut self, hz: f32) -> Result<()> {
        match non_negative("filter frequency base", hz) {
            Some(hz) => self.send(EngineCommand::SetFilterFrequencyBase(hz)),
            None => Ok(()),
        }
    }

    /// Set the filter cutoff reached with the envelope at zero, in Hz.
    pub fn set_filter_base_offset(&mut self, hz: f32) -> Result<()> {
        match non_negative("filter base offset", hz) {
            Some(hz) => self.send(EngineCommand::SetFilterBaseOffset(hz)),
            None => Ok(()),
        }
    }

    /// Set the filter resonance.
    pub fn set_filter_q(&mut self, q: f32) -> Result<()> {
        match non_negative("filter Q", q) {
            Some(q) => self.send(EngineCommand::SetFilterQ(q)),
            None => Ok(()),
        }
    }

    /// Set the filter response type.
    pub fn set_filter_type(&mut self, filter_type: FilterType) -> Result<()> {
        self.send(EngineCommand::SetFilterType(filter_type))?;
        self.filter_type = filter_type;
        Ok(())
    }

    /// Set the shelf gain. Ignored unless the filter is a shelf.
    pub fn set_filter_gain(&mut self, gain: f32) -> Result<()> {
        if !self.filter_type.uses_gain() {
            tracing::warn!(
                filter_type = ?self.filter_type,
                "gain only applies to shelf filters, ignored"
            );
            return Ok(());
        }
        match non_negative("filter gain", gain) {
            Some(gain) => self.send(EngineCommand::SetFilterGain(
                gain.max(timbre_core::ResonantFilter::MIN_GAIN),
            )),
            None => Ok(()),
        }
    }

    /// Set the attack time of one envelope, in seconds.
    pub fn set_attack_time(&mut self, target: EnvelopeTarget, secs: f32) -> Result<()> {
        match non_negative("attack time", secs) {
            Some(secs) => self.send(EngineCommand::SetAttackTime { target, secs }),
            None => Ok(()),
        }
    }

    /// Set the decay time of one envelope, in seconds.
    pub fn set_decay_time(&mut self, target: EnvelopeTarget, secs: f32) -> Result<()> {
        match non_negative("decay time", secs) {
            Some(secs) => self.send(EngineCommand::SetDecayTime { target, secs }),
            None => Ok(()),
        }
    }

    /// Set the sustain level of one envelope, clamped to [0, 1].
    pub fn set_sustain_level(&mut self, target: EnvelopeTarget, level: f32) -> Result<()> {
        match unit_range("sustain level", level) {
            Some(level) => self.send(EngineCommand::SetSustainLevel { target, level }),
            None => Ok(()),
        }
    }

    /// Set the release time of one envelope, in seconds.
    pub fn set_release_time(&mut self, target: EnvelopeTarget, secs: f32) -> Result<()> {
        match non_negative("release time", secs) {
            Some(secs) => self.send(EngineCommand::SetReleaseTime { target, secs }),
            None => Ok(()),
        }
    }

    /// Set all ADSR parameters of one envelope.
    ///
    /// A NaN in any position drops the whole command.
    pub fn set_adsr(
        &mut self,
        target: EnvelopeTarget,
        attack: f32,
        decay: f32,
        sustain: f32,
        release: f32,
    ) -> Result<()> {
        let (Some(attack), Some(decay), Some(sustain), Some(release)) = (
            non_negative("attack time", attack),
            non_negative("decay time", decay),
            unit_range("sustain level", sustain),
            non_negative("release time", release),
        ) else {
            return Ok(());
        };
        self.send(EngineCommand::SetAdsr {
            target,
            attack,
            decay,
            sustain,
            release,
        })
    }

    /// Set the distortion drive. Values below the stage minimum are raised to it.
    pub fn set_distortion_gain(&mut self, gain: f32) -> Result<()> {
        if gain.is_nan() {
            tracing::warn!("distortion gain is NaN, ignored");
            return Ok(());
        }
        let gain = if gain < DistortionStage::MIN_GAIN {
            tracing::warn!(requested = gain, "distortion gain must be positive, clamped");
            DistortionStage::MIN_GAIN
        } else {
            gain
        };
        self.send(EngineCommand::SetDistortionGain(gain))
    }

    /// Switch the distortion stage in or out.
    pub fn set_distortion_enabled(&mut self, enabled: bool) -> Result<()> {
        self.send(EngineCommand::SetDistortionEnabled(enabled))
    }

    /// Select the distortion curve.
    pub fn set_clip_type(&mut self, clip_type: ClipType) -> Result<()> {
        self.send(EngineCommand::SetClipType(clip_type))
    }

    /// Select the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) -> Result<()> {
        self.send(EngineCommand::SetWaveform(waveform))
    }

    /// Set the voice output trim.
    pub fn set_voice_gain(&mut self, gain: f32) -> Result<()> {
        match non_negative("voice gain", gain) {
            Some(gain) => self.send(EngineCommand::SetVoiceGain(gain)),
            None => Ok(()),
        }
    }

    /// Set the engine output trim applied before the soft clip.
    pub fn set_output_gain(&mut self, gain: f32) -> Result<()> {
        match non_negative("output gain", gain) {
            Some(gain) => self.send(EngineCommand::SetOutputGain(gain)),
            None => Ok(()),
        }
    }

    /// Free slots in the queue.
    pub fn available(&self) -> usize {
        self.producer.slots()
    }

    /// Whether the engine side of the queue has been dropped.
    pub fn is_disconnected(&self) -> bool {
        self.producer.is_abandoned()
    }

    fn send(&mut self, command: EngineCommand) -> Result<()> {
        if self.producer.is_abandoned() {
            return Err(Error::Stream("audio engine has been dropped".into()));
        }
        match self.producer.push(command) {
            Ok(()) => {
                tracing::trace!(?command, "command queued");
                Ok(())
            }
            Err(PushError::Full(command)) => {
                tracing::debug!(?command, "command queue full");
                Err(Error::QueueFull)
            }
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("available", &self.available())
            .field("filter_type", &self.filter_type)
            .finish_non_exhaustive()
    }
}

/// Clamp to `>= 0`, logging; `None` for NaN.
fn non_negative(name: &'static str, value: f32) -> Option<f32> {
    if value.is_nan() {
        tracing::warn!(parameter = name, "NaN ignored");
        return None;
    }
    if value < 0.0 {
        tracing::warn!(parameter = name, requested = value, "negative value clamped to 0");
        return Some(0.0);
    }
    Some(value)
}

/// Clamp to `[0, 1]`, logging; `None` for NaN.
fn unit_range(name: &'static str, value: f32) -> Option<f32> {
    if value.is_nan() {
        tracing::warn!(parameter = name, "NaN ignored");
        return None;
    }
    if !(0.0..=1.0).contains(&value) {
        tracing::warn!(parameter = name, requested = value, "value outside [0, 1], clamped");
    }
    Some(value.clamp(0.0, 1.0))
}
