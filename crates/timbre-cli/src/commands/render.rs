//! Offline render of a step pattern to WAV.

use super::common::{EngineArgs, PatternArgs, VoiceArgs};
use crate::pattern::Event;
use clap::Args;
use std::path::PathBuf;
use timbre_io::{AudioEngine, WavSpec, write_wav};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Passes through the pattern
    #[arg(long, default_value = "1")]
    loops: u32,

    #[command(flatten)]
    pattern: PatternArgs,

    #[command(flatten)]
    voice: VoiceArgs,

    #[command(flatten)]
    engine: EngineArgs,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = args.engine.engine_config()?;
    let pattern = args.pattern.pattern()?;
    let sample_rate = config.sample_rate;
    let channels = config.channels;
    let block = config.buffer_size as usize;

    let (mut engine, mut handle) = AudioEngine::new(config)?;
    args.voice.apply(&mut handle)?;

    let events = pattern.events(sample_rate, args.loops);
    let tail = (args.voice.release_tail().as_secs_f64() * f64::from(sample_rate)).round() as u64;
    let total_frames = pattern.frames_per_loop(sample_rate) * u64::from(args.loops) + tail;

    println!(
        "Rendering {} step(s) x {} at {} bpm to {}",
        pattern.steps().len(),
        args.loops,
        args.pattern.bpm,
        args.output.display()
    );

    let channel_count = usize::from(channels);
    let mut samples = vec![0.0f32; total_frames as usize * channel_count];
    let mut pending = events.iter().peekable();
    let mut frame = 0u64;

    // Split each block at event frames so notes land sample-accurately
    for chunk in samples.chunks_mut(block * channel_count) {
        let mut offset = 0usize;
        let chunk_frames = (chunk.len() / channel_count) as u64;
        let block_end = frame + chunk_frames;

        while let Some(&&(at, event)) = pending.peek() {
            if at >= block_end {
                break;
            }
            let split = ((at - frame) as usize) * channel_count;
            if split > offset {
                engine.render(&mut chunk[offset..split]);
                offset = split;
            }
            match event {
                Event::NoteOn(note) => handle.note_on(note)?,
                Event::NoteOff => handle.note_off()?,
            }
            pending.next();
        }
        engine.render(&mut chunk[offset..]);
        frame = block_end;
    }

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav(&args.output, &samples, spec)?;

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!(
        "  {} frames, {:.2}s, peak {:.3}",
        total_frames,
        total_frames as f64 / f64::from(sample_rate),
        peak
    );
    tracing::info!(path = %args.output.display(), frames = total_frames, "render complete");
    Ok(())
}
