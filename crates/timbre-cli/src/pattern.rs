//! Step pattern parser and scheduler.
//!
//! A pattern is a comma-separated list of MIDI notes, with `-` as a rest:
//!
//! ```text
//! 60,63,-,67
//! ```
//!
//! Every step is a sixteenth note at the pattern's tempo. A note sounds for
//! `gate` of its step and is then released; a rest leaves the voice in
//! whatever release phase the previous note started.
//!
//! Two consumers share the same schedule: `render` turns it into frame
//! offsets for offline output, `play` walks it on the wall clock.

use std::str::FromStr;
use std::time::Duration;

/// Steps per beat (sixteenth notes).
const STEPS_PER_BEAT: f64 = 4.0;

/// Errors from pattern parsing or validation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PatternError {
    /// The pattern contains no steps.
    #[error("pattern is empty")]
    Empty,
    /// A step is neither a note number nor `-`.
    #[error("invalid step '{token}' at position {index} (expected 0-127 or '-')")]
    InvalidStep {
        /// Zero-based step index.
        index: usize,
        /// The offending token.
        token: String,
    },
    /// Tempo must be a positive, finite number.
    #[error("bpm must be positive, got {0}")]
    InvalidBpm(f64),
    /// Gate must lie in (0, 1].
    #[error("gate must be in (0, 1], got {0}")]
    InvalidGate(f64),
}

/// One step of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Trigger a MIDI note.
    Note(u8),
    /// Leave the voice alone.
    Rest,
}

impl FromStr for Step {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "-" => Ok(Step::Rest),
            _ => match token.parse::<u8>() {
                Ok(note) if note <= 127 => Ok(Step::Note(note)),
                _ => Err(()),
            },
        }
    }
}

/// A note-on or note-off at a point in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Tune and trigger.
    NoteOn(u8),
    /// Release.
    NoteOff,
}

/// A parsed step sequence with tempo and gate length.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    steps: Vec<Step>,
    bpm: f64,
    gate: f64,
}

impl Pattern {
    /// Parse `steps` and validate tempo and gate.
    pub fn parse(steps: &str, bpm: f64, gate: f64) -> Result<Self, PatternError> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(PatternError::InvalidBpm(bpm));
        }
        if !(gate > 0.0 && gate <= 1.0) {
            return Err(PatternError::InvalidGate(gate));
        }

        let steps = steps
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .enumerate()
            .map(|(index, token)| {
                token.parse::<Step>().map_err(|()| PatternError::InvalidStep {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { steps, bpm, gate })
    }

    /// The parsed steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Length of one step.
    pub fn step_duration(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm / STEPS_PER_BEAT)
    }

    /// How long a note sounds before its note-off.
    pub fn gate_duration(&self) -> Duration {
        self.step_duration().mul_f64(self.gate)
    }

    /// Length of one pass through the pattern, in frames.
    pub fn frames_per_loop(&self, sample_rate: u32) -> u64 {
        self.steps.len() as u64 * self.step_frames(sample_rate)
    }

    fn step_frames(&self, sample_rate: u32) -> u64 {
        (self.step_duration().as_secs_f64() * f64::from(sample_rate)).round() as u64
    }

    /// Frame-stamped events for `loops` passes, in playback order.
    ///
    /// A gate of 1 puts a note's release on the same frame as the next
    /// note's trigger; the release comes first.
    pub fn events(&self, sample_rate: u32, loops: u32) -> Vec<(u64, Event)> {
        let step_frames = self.step_frames(sample_rate);
        let gate_frames = ((step_frames as f64) * self.gate).round() as u64;
        let loop_frames = self.frames_per_loop(sample_rate);

        let mut events = Vec::new();
        for pass in 0..u64::from(loops) {
            for (i, step) in self.steps.iter().enumerate() {
                if let Step::Note(note) = *step {
                    let start = pass * loop_frames + i as u64 * step_frames;
                    events.push((start, Event::NoteOn(note)));
                    events.push((start + gate_frames, Event::NoteOff));
                }
            }
        }
        // stable: equal frames keep release-before-trigger order
        events.sort_by_key(|&(frame, _)| frame);
        events
    }
}
