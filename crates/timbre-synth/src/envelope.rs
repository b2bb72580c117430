//! Linear ADSR envelope generator.
//!
//! Stage transitions are driven both by the level crossing its target and by
//! elapsed time, whichever comes first. Elapsed time is counted in whole
//! samples and each ramp is computed from that count rather than accumulated,
//! so an attack from zero ends on call `ceil(attack * sample_rate)` to
//! [`AdsrEnvelope::advance`], with `attack` taken at its stored `f32` value.
//! A 10 ms attack at 44.1 kHz ends on the 441st call; a 100 ms attack ends on
//! the 4411th, because `0.1f32` is slightly above one tenth.

/// ADSR envelope stages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Inactive, output held at zero.
    #[default]
    Off,
    /// Rising toward 1.0.
    Attack,
    /// Falling from 1.0 toward the sustain level.
    Decay,
    /// Holding the sustain level until note-off.
    Sustain,
    /// Falling to zero after note-off.
    Release,
}

/// Linear attack-decay-sustain-release envelope.
///
/// Times are in seconds. A zero-length stage completes on the sample it is
/// entered: the level snaps to the stage target and the next stage begins.
///
/// The output is always within `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use timbre_synth::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(44100.0);
/// env.set_adsr(0.01, 0.1, 0.7, 0.2);
///
/// env.note_on();
/// for _ in 0..441 {
///     env.advance();
/// }
/// assert_eq!(env.state(), EnvelopeState::Decay);
/// assert_eq!(env.level(), 1.0);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,

    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    /// Samples elapsed since the last note-on
    since_note_on: u64,
    /// Samples elapsed since the last note-off
    since_note_off: u64,
    /// Samples elapsed before the decay stage began
    decay_start: u64,
    /// Level at the start of the current attack or release ramp
    ramp_from: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an envelope in the `Off` state.
    ///
    /// Default values:
    /// - Attack: 10 ms
    /// - Decay: 100 ms
    /// - Sustain: 0.7
    /// - Release: 200 ms
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Off,
            level: 0.0,
            sample_rate: timbre_core::sanitize_sample_rate(sample_rate),
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
            since_note_on: 0,
            since_note_off: 0,
            decay_start: 0,
            ramp_from: 0.0,
        }
    }

    /// Set attack time in seconds. Negative values become 0.
    pub fn set_attack(&mut self, secs: f32) {
        if let Some(secs) = sanitize_time(secs, "attack") {
            self.attack = secs;
        }
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Set decay time in seconds. Negative values become 0.
    pub fn set_decay(&mut self, secs: f32) {
        if let Some(secs) = sanitize_time(secs, "decay") {
            self.decay = secs;
        }
    }

    /// Decay time in seconds.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Set sustain level, clamped to [0, 1].
    pub fn set_sustain(&mut self, level: f32) {
        if level.is_nan() {
            #[cfg(feature = "tracing")]
            tracing::warn!("sustain level is NaN, ignored");
            return;
        }
        if !(0.0..=1.0).contains(&level) {
            #[cfg(feature = "tracing")]
            tracing::warn!(requested = level, "sustain level outside [0, 1], clamped");
        }
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in seconds. Negative values become 0.
    pub fn set_release(&mut self, secs: f32) {
        if let Some(secs) = sanitize_time(secs, "release") {
            self.release = secs;
        }
    }

    /// Release time in seconds.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Set all four parameters at once.
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.set_attack(attack);
        self.set_decay(decay);
        self.set_sustain(sustain);
        self.set_release(release);
    }

    /// Set sample rate. Non-positive or non-finite rates are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
    }

    /// Start (or restart) the attack stage from the current level.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.since_note_on = 0;
        self.ramp_from = self.level;
    }

    /// Enter the release stage. Does nothing while `Off`.
    ///
    /// The level then falls by `sustain / release` per second from wherever it
    /// was, and the stage ends once `release` seconds have passed.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Off {
            return;
        }
        self.state = EnvelopeState::Release;
        self.since_note_off = 0;
        self.ramp_from = self.level;
    }

    /// Force the envelope to `Off` at level 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Off;
        self.level = 0.0;
        self.since_note_on = 0;
        self.since_note_off = 0;
        self.decay_start = 0;
        self.ramp_from = 0.0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Whether the envelope is producing a non-`Off` stage.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Off
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Off => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.since_note_on += 1;
                if self.attack <= 0.0 {
                    self.enter_decay();
                } else {
                    let level = f64::from(self.ramp_from)
                        + self.ramp(self.since_note_on, self.attack, 1.0);
                    if level >= 1.0
                        || self.elapsed(self.since_note_on) >= f64::from(self.attack)
                    {
                        self.enter_decay();
                    } else {
                        self.level = level as f32;
                    }
                }
            }

            EnvelopeState::Decay => {
                self.since_note_on += 1;
                if self.decay <= 0.0 {
                    self.enter_sustain();
                } else {
                    let depth = 1.0 - self.sustain;
                    let into_decay = self.since_note_on - self.decay_start;
                    let level = 1.0 - self.ramp(into_decay, self.decay, depth);
                    let deadline = f64::from(self.attack) + f64::from(self.decay);
                    if level <= f64::from(self.sustain)
                        || self.elapsed(self.since_note_on) >= deadline
                    {
                        self.enter_sustain();
                    } else {
                        self.level = level as f32;
                    }
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeState::Release => {
                self.since_note_off += 1;
                if self.release <= 0.0 {
                    self.enter_off();
                } else {
                    let level = f64::from(self.ramp_from)
                        - self.ramp(self.since_note_off, self.release, self.sustain);
                    if level <= 0.0
                        || self.elapsed(self.since_note_off) >= f64::from(self.release)
                    {
                        self.enter_off();
                    } else {
                        self.level = level as f32;
                    }
                }
            }
        }

        self.level
    }

    #[inline]
    fn elapsed(&self, samples: u64) -> f64 {
        samples as f64 / f64::from(self.sample_rate)
    }

    /// Distance covered after `samples` by a ramp moving `span` per `secs`.
    #[inline]
    fn ramp(&self, samples: u64, secs: f32, span: f32) -> f64 {
        samples as f64 / (f64::from(self.sample_rate) * f64::from(secs)) * f64::from(span)
    }

    fn enter_decay(&mut self) {
        self.level = 1.0;
        self.decay_start = self.since_note_on;
        self.state = EnvelopeState::Decay;
    }

    fn enter_sustain(&mut self) {
        self.level = self.sustain;
        self.state = EnvelopeState::Sustain;
    }

    fn enter_off(&mut self) {
        self.level = 0.0;
        self.state = EnvelopeState::Off;
    }
}

/// Clamp a stage time to `>= 0`, rejecting NaN.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn sanitize_time(secs: f32, stage: &'static str) -> Option<f32> {
    if secs.is_nan() {
        #[cfg(feature = "tracing")]
        tracing::warn!(stage, "envelope time is NaN, ignored");
        return None;
    }
    if secs < 0.0 {
        #[cfg(feature = "tracing")]
        tracing::warn!(stage, requested = secs, "negative envelope time, clamped to 0");
        return Some(0.0);
    }
    Some(secs)
}
