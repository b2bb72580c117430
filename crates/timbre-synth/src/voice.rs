//! The monophonic synthesis voice.
//!
//! Signal chain, one sample at a time:
//!
//! ```text
//! Oscillator -> DcBlocker -> ResonantFilter -> * amp_env * gain -> [DistortionStage]
//!                                  ^
//!                 base_offset + base_frequency * filter_env
//! ```

use crate::envelope::AdsrEnvelope;
use crate::oscillator::{Oscillator, OscillatorWaveform};
use timbre_core::{
    ClipType, DcBlocker, DistortionStage, FilterType, ResonantFilter, sanitize_sample_rate,
};

/// Which of the voice's two envelopes a setter addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeTarget {
    /// Scales the output level.
    #[default]
    Amplitude,
    /// Modulates the filter cutoff.
    Filter,
}

/// Single oscillator, two envelopes, a resonant filter and optional drive.
///
/// ## Parameters
/// - `filter_base_offset`: Cutoff with the filter envelope at 0, in Hz (>= 0, default 100.0)
/// - `filter_frequency_base`: Cutoff added at filter envelope 1.0, in Hz (>= 0, default 2500.0)
/// - `gain`: Voice output trim (>= 0, default 0.5)
/// - `distortion_enabled`: Whether the drive stage runs (default false)
///
/// The voice owns everything it needs; notes reuse it without reconstruction
/// and nothing on the per-sample path allocates.
///
/// # Example
///
/// ```rust
/// use timbre_synth::{EnvelopeTarget, SynthVoice};
///
/// let mut voice = SynthVoice::new(44100.0);
/// voice.set_adsr(EnvelopeTarget::Amplitude, 0.005, 0.1, 0.8, 0.3);
/// voice.note_on(69);
/// assert_eq!(voice.frequency(), 440.0);
///
/// for _ in 0..512 {
///     let sample = voice.process();
///     assert!(sample.is_finite());
/// }
/// voice.note_off();
/// ```
#[derive(Debug, Clone)]
pub struct SynthVoice {
    osc: Oscillator,
    amp_env: AdsrEnvelope,
    filter_env: AdsrEnvelope,
    filter: ResonantFilter,
    dc_blocker: DcBlocker,
    distortion: DistortionStage,
    distortion_enabled: bool,

    sample_rate: f32,
    filter_base_offset: f32,
    filter_frequency_base: f32,
    gain: f32,
}

impl Default for SynthVoice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl SynthVoice {
    /// Create a voice with a saw oscillator into a resonant lowpass.
    ///
    /// An unusable `sample_rate` is replaced by
    /// [`FALLBACK_SAMPLE_RATE`](timbre_core::FALLBACK_SAMPLE_RATE).
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sanitize_sample_rate(sample_rate);
        let mut osc = Oscillator::new(sample_rate);
        osc.set_waveform(OscillatorWaveform::Saw);

        let mut filter = ResonantFilter::new(FilterType::LowPass, sample_rate);
        filter.set_q(2.0);

        let mut filter_env = AdsrEnvelope::new(sample_rate);
        filter_env.set_adsr(0.005, 0.25, 0.3, 0.2);

        let mut voice = Self {
            osc,
            amp_env: AdsrEnvelope::new(sample_rate),
            filter_env,
            filter,
            dc_blocker: DcBlocker::new(),
            distortion: DistortionStage::new(ClipType::Tanh),
            distortion_enabled: false,
            sample_rate,
            filter_base_offset: 100.0,
            filter_frequency_base: 2500.0,
            gain: 0.5,
        };
        voice.apply_cutoff(0.0);
        voice
    }

    /// Set sample rate for all components. Non-positive or non-finite rates are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = sample_rate, "unusable sample rate, ignored");
            return;
        }
        self.sample_rate = sample_rate;
        self.osc.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Tune to a MIDI note and trigger both envelopes.
    pub fn note_on(&mut self, note: u8) {
        self.osc.set_frequency(midi_to_freq(note));
        self.amp_env.note_on();
        self.filter_env.note_on();
    }

    /// Release both envelopes.
    pub fn note_off(&mut self) {
        self.amp_env.note_off();
        self.filter_env.note_off();
    }

    /// Whether the amplitude envelope is still sounding.
    pub fn is_active(&self) -> bool {
        self.amp_env.is_active()
    }

    /// Override the oscillator frequency directly, bypassing note conversion.
    pub fn set_frequency(&mut self, hz: f32) {
        self.osc.set_frequency(hz);
    }

    /// Oscillator frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    /// Set the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.osc.set_waveform(waveform);
    }

    /// Set the cutoff added at full filter envelope (modulation depth), in Hz.
    pub fn set_filter_frequency_base(&mut self, hz: f32) {
        if let Some(hz) = non_negative(hz, "filter frequency base") {
            self.filter_frequency_base = hz;
        }
    }

    /// Modulation depth of the filter envelope, in Hz.
    pub fn filter_frequency_base(&self) -> f32 {
        self.filter_frequency_base
    }

    /// Set the cutoff reached with the filter envelope at zero, in Hz.
    pub fn set_filter_base_offset(&mut self, hz: f32) {
        if let Some(hz) = non_negative(hz, "filter base offset") {
            self.filter_base_offset = hz;
        }
    }

    /// Cutoff floor of the filter envelope, in Hz.
    pub fn filter_base_offset(&self) -> f32 {
        self.filter_base_offset
    }

    /// Set the filter resonance.
    pub fn set_filter_q(&mut self, q: f32) {
        self.filter.set_q(q);
    }

    /// Set the filter response type.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter.set_filter_type(filter_type);
    }

    /// Set the shelf gain (lowshelf / highshelf only).
    pub fn set_filter_gain(&mut self, gain: f32) {
        self.filter.set_gain(gain);
    }

    /// The voice's filter.
    pub fn filter(&self) -> &ResonantFilter {
        &self.filter
    }

    /// One of the two envelopes.
    pub fn envelope(&self, target: EnvelopeTarget) -> &AdsrEnvelope {
        match target {
            EnvelopeTarget::Amplitude => &self.amp_env,
            EnvelopeTarget::Filter => &self.filter_env,
        }
    }

    fn envelope_mut(&mut self, target: EnvelopeTarget) -> &mut AdsrEnvelope {
        match target {
            EnvelopeTarget::Amplitude => &mut self.amp_env,
            EnvelopeTarget::Filter => &mut self.filter_env,
        }
    }

    /// Set the attack time of one envelope, in seconds.
    pub fn set_attack_time(&mut self, target: EnvelopeTarget, secs: f32) {
        self.envelope_mut(target).set_attack(secs);
    }

    /// Set the decay time of one envelope, in seconds.
    pub fn set_decay_time(&mut self, target: EnvelopeTarget, secs: f32) {
        self.envelope_mut(target).set_decay(secs);
    }

    /// Set the sustain level of one envelope.
    pub fn set_sustain_level(&mut self, target: EnvelopeTarget, level: f32) {
        self.envelope_mut(target).set_sustain(level);
    }

    /// Set the release time of one envelope, in seconds.
    pub fn set_release_time(&mut self, target: EnvelopeTarget, secs: f32) {
        self.envelope_mut(target).set_release(secs);
    }

    /// Set all ADSR parameters of one envelope.
    pub fn set_adsr(
        &mut self,
        target: EnvelopeTarget,
        attack: f32,
        decay: f32,
        sustain: f32,
        release: f32,
    ) {
        self.envelope_mut(target)
            .set_adsr(attack, decay, sustain, release);
    }

    /// Set the distortion drive.
    pub fn set_distortion_gain(&mut self, gain: f32) {
        self.distortion.set_gain(gain);
    }

    /// Select the distortion curve.
    pub fn set_clip_type(&mut self, clip_type: ClipType) {
        self.distortion.set_clip_type(clip_type);
    }

    /// Switch the distortion stage in or out of the chain.
    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.distortion_enabled = enabled;
    }

    /// Whether the distortion stage runs.
    pub fn distortion_enabled(&self) -> bool {
        self.distortion_enabled
    }

    /// The voice's distortion stage.
    pub fn distortion(&self) -> &DistortionStage {
        &self.distortion
    }

    /// Set the voice output trim.
    pub fn set_gain(&mut self, gain: f32) {
        if let Some(gain) = non_negative(gain, "voice gain") {
            self.gain = gain;
        }
    }

    /// Voice output trim.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Produce one output sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let filter_level = self.filter_env.advance();
        self.apply_cutoff(filter_level);

        let raw = self.osc.advance();
        let filtered = self.filter.process(self.dc_blocker.process(raw));
        let out = filtered * self.amp_env.advance() * self.gain;

        if self.distortion_enabled {
            self.distortion.process(out)
        } else {
            out
        }
    }

    /// Set the cutoff for a filter envelope level, clamped into [0, Nyquist].
    #[inline]
    fn apply_cutoff(&mut self, filter_level: f32) {
        let cutoff = self.filter_base_offset + self.filter_frequency_base * filter_level;
        self.filter
            .set_frequency(cutoff.clamp(0.0, self.sample_rate * 0.5));
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn non_negative(value: f32, name: &'static str) -> Option<f32> {
    if value.is_nan() {
        #[cfg(feature = "tracing")]
        tracing::warn!(parameter = name, "NaN ignored");
        return None;
    }
    if value < 0.0 {
        #[cfg(feature = "tracing")]
        tracing::warn!(parameter = name, requested = value, "negative value clamped to 0");
        return Some(0.0);
    }
    Some(value)
}

/// Convert a MIDI note number to frequency in Hz (A4 = note 69 = 440 Hz).
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeState;

    const SR: f32 = 44100.0;

    #[test]
    fn test_midi_to_freq() {
        assert_eq!(midi_to_freq(69), 440.0);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-3);
        assert!((midi_to_freq(60) - 261.6256).abs() < 0.01);
    }

    #[test]
    fn test_note_on_sets_exact_pitch() {
        let mut voice = SynthVoice::new(SR);
        voice.note_on(69);
        assert_eq!(voice.frequency(), 440.0);
    }

    #[test]
    fn test_silent_before_note_on() {
        let mut voice = SynthVoice::new(SR);
        for _ in 0..1000 {
            assert_eq!(voice.process(), 0.0);
        }
    }

    #[test]
    fn test_note_produces_sound_then_silence() {
        let mut voice = SynthVoice::new(SR);
        voice.set_adsr(EnvelopeTarget::Amplitude, 0.001, 0.05, 0.7, 0.02);
        voice.note_on(57);

        let peak = (0..4410).map(|_| voice.process().abs()).fold(0.0f32, f32::max);
        assert!(peak > 0.05, "peak {peak}");

        voice.note_off();
        for _ in 0..(0.02 * SR) as usize + 2 {
            voice.process();
        }
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }

    #[test]
    fn test_note_on_triggers_both_envelopes() {
        let mut voice = SynthVoice::new(SR);
        voice.note_on(60);
        assert_eq!(voice.envelope(EnvelopeTarget::Amplitude).state(), EnvelopeState::Attack);
        assert_eq!(voice.envelope(EnvelopeTarget::Filter).state(), EnvelopeState::Attack);

        voice.note_off();
        assert_eq!(voice.envelope(EnvelopeTarget::Amplitude).state(), EnvelopeState::Release);
        assert_eq!(voice.envelope(EnvelopeTarget::Filter).state(), EnvelopeState::Release);
    }

    #[test]
    fn test_filter_envelope_drives_cutoff() {
        let mut voice = SynthVoice::new(SR);
        voice.set_filter_base_offset(200.0);
        voice.set_filter_frequency_base(3000.0);
        voice.set_adsr(EnvelopeTarget::Filter, 0.0, 0.0, 0.5, 0.1);

        voice.process();
        assert_eq!(voice.filter().frequency(), 200.0);

        voice.note_on(60);
        voice.process();
        assert_eq!(voice.filter().frequency(), 3200.0);
        voice.process();
        assert_eq!(voice.filter().frequency(), 1700.0);
    }

    #[test]
    fn test_cutoff_clamped_to_nyquist() {
        let mut voice = SynthVoice::new(SR);
        voice.set_filter_frequency_base(100_000.0);
        voice.set_attack_time(EnvelopeTarget::Filter, 0.0);
        voice.note_on(60);
        voice.process();
        assert_eq!(voice.filter().frequency(), SR * 0.5);
    }

    #[test]
    fn test_sustained_filter_skips_recompute() {
        let mut voice = SynthVoice::new(SR);
        voice.set_adsr(EnvelopeTarget::Filter, 0.0, 0.0, 0.4, 0.1);
        voice.note_on(60);
        voice.process();
        voice.process();

        let updates = voice.filter().coefficient_updates();
        for _ in 0..256 {
            voice.process();
        }
        assert_eq!(voice.filter().coefficient_updates(), updates);
    }

    #[test]
    fn test_distortion_bounds_output() {
        let mut voice = SynthVoice::new(SR);
        voice.set_gain(1.0);
        voice.set_filter_q(10.0);
        voice.set_distortion_enabled(true);
        voice.set_clip_type(ClipType::Diode);
        voice.set_distortion_gain(4.0);
        voice.set_adsr(EnvelopeTarget::Amplitude, 0.0, 0.0, 1.0, 0.1);
        voice.note_on(48);

        for _ in 0..8820 {
            let s = voice.process();
            assert!(s.abs() <= 0.25 + 1e-6, "got {s}");
        }
    }

    #[test]
    fn test_negative_parameters_clamp() {
        let mut voice = SynthVoice::new(SR);
        voice.set_filter_frequency_base(-5.0);
        voice.set_filter_base_offset(-5.0);
        voice.set_gain(-1.0);
        assert_eq!(voice.filter_frequency_base(), 0.0);
        assert_eq!(voice.filter_base_offset(), 0.0);
        assert_eq!(voice.gain(), 0.0);
    }

    #[test]
    fn test_unusable_sample_rate_falls_back() {
        for bad in [0.0, -1.0, f32::NAN] {
            let mut voice = SynthVoice::new(bad);
            assert_eq!(voice.sample_rate(), timbre_core::FALLBACK_SAMPLE_RATE);
            voice.note_on(60);
            for _ in 0..2000 {
                assert!(voice.process().is_finite(), "rate {bad}");
            }
        }

        let mut voice = SynthVoice::new(SR);
        voice.set_sample_rate(0.0);
        assert_eq!(voice.sample_rate(), SR);
    }

    #[test]
    fn test_voice_reusable_across_notes() {
        let mut voice = SynthVoice::new(SR);
        voice.set_adsr(EnvelopeTarget::Amplitude, 0.001, 0.01, 0.5, 0.005);
        for note in [48, 55, 60, 67, 72] {
            voice.note_on(note);
            for _ in 0..1000 {
                assert!(voice.process().is_finite());
            }
            voice.note_off();
            for _ in 0..500 {
                voice.process();
            }
            assert!(!voice.is_active());
        }
    }
}
