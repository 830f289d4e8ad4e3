//! Shared fixtures for the integration tests: WAV generation and a recording player.

#![allow(dead_code)]

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;
use std::sync::Mutex;
use storm_player::{AudioPlayer, DecodedAudio, Result};

pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Stereo 16-bit sine wave, both channels identical.
pub fn generate_sine_wav<P: AsRef<Path>>(path: P, duration_ms: u64, frequency_hz: f32, amplitude: f32) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).unwrap();
    let total_frames = (TEST_SAMPLE_RATE as u64 * duration_ms) / 1000;

    for frame in 0..total_frames {
        let t = frame as f32 / TEST_SAMPLE_RATE as f32;
        let value = ((2.0 * PI * frequency_hz * t).sin() * amplitude * i16::MAX as f32) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }

    writer.finalize().unwrap();
}

/// Stands in for the output device and remembers every buffer it was handed.
#[derive(Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<DecodedAudio>>,
}

impl RecordingPlayer {
    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    pub fn last_played(&self) -> Option<DecodedAudio> {
        self.played.lock().unwrap().last().cloned()
    }
}

impl AudioPlayer for RecordingPlayer {
    fn play(&self, audio: &DecodedAudio) -> Result<()> {
        self.played.lock().unwrap().push(audio.clone());
        Ok(())
    }
}

pub fn open_meteo_body(rain: f64, precipitation: f64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 21.3,
        "longitude": -157.875,
        "timezone": "Pacific/Honolulu",
        "current_units": {"time": "iso8601", "interval": "seconds", "precipitation": "mm", "rain": "mm"},
        "current": {"time": "2026-10-18T09:45", "interval": 900, "precipitation": precipitation, "rain": rain}
    })
}
