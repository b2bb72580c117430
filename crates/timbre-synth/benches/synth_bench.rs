//! Criterion benchmarks for timbre-synth components
//!
//! Run with: cargo bench -p timbre-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use timbre_core::ClipType;
use timbre_synth::{AdsrEnvelope, EnvelopeTarget, Oscillator, OscillatorWaveform, SynthVoice};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

// ============================================================================
// Oscillator benchmarks
// ============================================================================

fn bench_oscillator_waveforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for waveform in OscillatorWaveform::ALL {
        for &block_size in BLOCK_SIZES {
            let mut osc = Oscillator::new(SAMPLE_RATE);
            osc.set_frequency(440.0);
            osc.set_waveform(waveform);

            group.bench_with_input(
                BenchmarkId::new(format!("{waveform:?}"), block_size),
                &block_size,
                |b, &size| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for _ in 0..size {
                            sum += osc.advance();
                        }
                        black_box(sum)
                    })
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Envelope benchmarks
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    c.bench_function("AdsrEnvelope/cycle/1024", |b| {
        let mut env = AdsrEnvelope::new(SAMPLE_RATE);
        env.set_adsr(0.002, 0.005, 0.5, 0.005);
        b.iter(|| {
            env.note_on();
            for _ in 0..512 {
                black_box(env.advance());
            }
            env.note_off();
            for _ in 0..512 {
                black_box(env.advance());
            }
        })
    });
}

// ============================================================================
// Voice benchmarks
// ============================================================================

fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("SynthVoice");

    for &block_size in BLOCK_SIZES {
        // Filter envelope sweeping: cutoff recomputed every sample
        group.bench_with_input(
            BenchmarkId::new("sweeping", block_size),
            &block_size,
            |b, &size| {
                let mut voice = SynthVoice::new(SAMPLE_RATE);
                voice.set_adsr(EnvelopeTarget::Filter, 10.0, 0.1, 0.5, 0.1);
                voice.note_on(48);
                b.iter(|| {
                    for _ in 0..size {
                        black_box(voice.process());
                    }
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sustained_distorted", block_size),
            &block_size,
            |b, &size| {
                let mut voice = SynthVoice::new(SAMPLE_RATE);
                voice.set_adsr(EnvelopeTarget::Filter, 0.0, 0.0, 0.5, 0.1);
                voice.set_distortion_enabled(true);
                voice.set_clip_type(ClipType::Diode);
                voice.note_on(48);
                b.iter(|| {
                    for _ in 0..size {
                        black_box(voice.process());
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator_waveforms, bench_envelope, bench_voice);
criterion_main!(benches);
