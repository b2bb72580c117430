//! End-to-end tests for the engine, control path, config and WAV output.

use std::sync::{Arc, Mutex};
use timbre_io::{
    AudioBackend, AudioDevice, AudioEngine, EngineConfig, Error, ErrorCallback, OutputCallback,
    OutputConfig, StreamHandle, WavSpec, write_wav,
};
use timbre_synth::EnvelopeTarget;

/// Backend that hands the output callback to the test instead of a device.
struct CaptureBackend {
    rate: u32,
    callback: Arc<Mutex<Option<OutputCallback>>>,
    requested: Arc<Mutex<Option<OutputConfig>>>,
}

impl CaptureBackend {
    fn new(rate: u32) -> Self {
        Self {
            rate,
            callback: Arc::new(Mutex::new(None)),
            requested: Arc::new(Mutex::new(None)),
        }
    }

    fn pull(&self, out: &mut [f32]) {
        let mut guard = self.callback.lock().unwrap();
        let callback = guard.as_mut().expect("stream not started");
        callback(out);
    }
}

impl AudioBackend for CaptureBackend {
    fn name(&self) -> &str {
        "capture"
    }

    fn list_devices(&self) -> timbre_io::Result<Vec<AudioDevice>> {
        Ok(vec![])
    }

    fn default_output_device(&self) -> timbre_io::Result<Option<AudioDevice>> {
        Ok(None)
    }

    fn build_output_stream(
        &self,
        config: &OutputConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> timbre_io::Result<StreamHandle> {
        *self.callback.lock().unwrap() = Some(callback);
        *self.requested.lock().unwrap() = Some(config.clone());
        Ok(StreamHandle::new(()))
    }

    fn actual_sample_rate(&self, _config: &OutputConfig) -> u32 {
        self.rate
    }
}

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn test_render_is_bounded_and_channel_duplicated() {
    let (mut engine, mut handle) = AudioEngine::new(EngineConfig {
        output_gain: 10.0,
        ..EngineConfig::default()
    })
    .unwrap();
    handle.set_voice_gain(4.0).unwrap();
    handle.set_filter_q(20.0).unwrap();
    handle.note_on(48).unwrap();

    let mut buffer = vec![0.0f32; 2 * 4800];
    engine.render(&mut buffer);

    assert!(buffer.iter().all(|s| s.is_finite() && s.abs() < 1.0));
    assert!(peak(&buffer) > 0.5, "hot signal should approach the clip");
    for frame in buffer.chunks(2) {
        assert_eq!(frame[0], frame[1]);
    }
}

#[test]
fn test_release_returns_to_silence() {
    let (mut engine, mut handle) = AudioEngine::new(EngineConfig::default()).unwrap();
    handle
        .set_adsr(EnvelopeTarget::Amplitude, 0.001, 0.01, 0.5, 0.01)
        .unwrap();
    handle.note_on(60).unwrap();

    let mut buffer = vec![0.0f32; 2 * 4800];
    engine.render(&mut buffer);
    assert!(peak(&buffer) > 0.01);

    handle.note_off().unwrap();
    engine.render(&mut buffer);
    assert!(!engine.voice().is_active());

    engine.render(&mut buffer);
    assert!(buffer.iter().all(|&s| s == 0.0));
}

#[test]
fn test_command_lands_on_next_buffer() {
    let (mut engine, mut handle) = AudioEngine::new(EngineConfig::default()).unwrap();
    handle.note_on(69).unwrap();
    engine.render(&mut [0.0f32; 64]);

    handle.set_frequency(1000.0).unwrap();
    assert!((engine.voice().frequency() - 440.0).abs() < 1e-3);
    engine.render(&mut [0.0f32; 64]);
    assert_eq!(engine.voice().frequency(), 1000.0);
}

#[test]
fn test_queue_backpressure_clears_after_render() {
    let (mut engine, mut handle) = AudioEngine::new(EngineConfig {
        command_capacity: 2,
        ..EngineConfig::default()
    })
    .unwrap();
    handle.set_filter_q(1.0).unwrap();
    handle.set_filter_q(2.0).unwrap();
    assert!(matches!(handle.set_filter_q(3.0), Err(Error::QueueFull)));

    engine.render(&mut [0.0f32; 2]);
    assert_eq!(handle.available(), 2);
    handle.set_filter_q(3.0).unwrap();
    engine.render(&mut [0.0f32; 2]);
    assert_eq!(engine.voice().filter().q(), 3.0);
}

#[test]
fn test_start_adopts_backend_rate() {
    let backend = CaptureBackend::new(44100);
    let (engine, mut handle) = AudioEngine::new(EngineConfig {
        buffer_size: 128,
        device_name: Some("speakers".into()),
        ..EngineConfig::default()
    })
    .unwrap();

    let stream = engine.start(&backend).unwrap();
    assert_eq!(stream.backend(), "capture");
    assert_eq!(stream.sample_rate(), 44100);
    assert_eq!(stream.channels(), 2);

    let requested = backend.requested.lock().unwrap().clone().unwrap();
    assert_eq!(requested.sample_rate, 44100);
    assert_eq!(requested.buffer_size, 128);
    assert_eq!(requested.device_name.as_deref(), Some("speakers"));

    handle.note_on(60).unwrap();
    let mut buffer = vec![0.0f32; 256];
    backend.pull(&mut buffer);
    assert!(peak(&buffer) > 0.0);
    assert!(buffer.iter().all(|s| s.abs() < 1.0));
}

#[test]
fn test_dropping_stream_disconnects_handle() {
    let backend = CaptureBackend::new(48000);
    let (engine, handle) = AudioEngine::new(EngineConfig::default()).unwrap();
    let stream = engine.start(&backend).unwrap();
    assert!(!handle.is_disconnected());

    drop(stream);
    // the engine lives in the callback, which the backend still owns
    backend.callback.lock().unwrap().take();
    assert!(handle.is_disconnected());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    let config = EngineConfig {
        sample_rate: 44100,
        buffer_size: 512,
        channels: 1,
        device_name: Some("USB".into()),
        output_gain: 0.5,
        command_capacity: 64,
    };
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    assert_eq!(EngineConfig::load(&path).unwrap(), config);
}

#[test]
fn test_config_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_offline_render_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.wav");

    let (mut engine, mut handle) = AudioEngine::new(EngineConfig::default()).unwrap();
    handle.note_on(57).unwrap();
    let mut samples = vec![0.0f32; 2 * 4800];
    engine.render(&mut samples);

    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
    };
    write_wav(&path, &samples, spec).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 48000);
    let read: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(read, samples);
}
