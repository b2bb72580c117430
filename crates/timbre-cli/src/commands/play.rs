//! Real-time playback of a step pattern.

use super::common::{EngineArgs, PatternArgs, VoiceArgs};
use crate::pattern::Step;
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use timbre_io::{AudioEngine, CpalBackend, EngineHandle};

#[derive(Args)]
pub struct PlayArgs {
    /// Passes through the pattern (repeats until Ctrl+C if omitted)
    #[arg(long)]
    loops: Option<u32>,

    /// Output device (partial name match)
    #[arg(short, long)]
    output: Option<String>,

    #[command(flatten)]
    pattern: PatternArgs,

    #[command(flatten)]
    voice: VoiceArgs,

    #[command(flatten)]
    engine: EngineArgs,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let mut config = args.engine.engine_config()?;
    if args.output.is_some() {
        config.device_name = args.output.clone();
    }
    let pattern = args.pattern.pattern()?;

    let (engine, mut handle) = AudioEngine::new(config)?;
    args.voice.apply(&mut handle)?;

    let backend = CpalBackend::new();
    let stream = engine.start(&backend)?;
    println!(
        "Playing {} step(s) at {} bpm ({} Hz, {} ch via {}). Press Ctrl+C to stop.",
        pattern.steps().len(),
        args.pattern.bpm,
        stream.sample_rate(),
        stream.channels(),
        stream.backend()
    );

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let step = pattern.step_duration();
    let gate = pattern.gate_duration();
    let mut next = Instant::now();
    let mut pass = 0u32;

    'outer: while args.loops.is_none_or(|loops| pass < loops) {
        for &s in pattern.steps() {
            if !running.load(Ordering::SeqCst) {
                break 'outer;
            }
            if let Step::Note(note) = s {
                send(&mut handle, |h| h.note_on(note));
                sleep_until(next + gate);
                send(&mut handle, EngineHandle::note_off);
            }
            next += step;
            sleep_until(next);
        }
        pass += 1;
    }

    send(&mut handle, EngineHandle::note_off);
    std::thread::sleep(args.voice.release_tail());
    drop(stream);
    println!("Done!");
    Ok(())
}

/// Best-effort send: a full queue drops the event instead of stalling the pattern.
fn send(handle: &mut EngineHandle, command: impl FnOnce(&mut EngineHandle) -> timbre_io::Result<()>) {
    if let Err(e) = command(handle) {
        tracing::warn!(error = %e, "pattern event dropped");
    }
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}

