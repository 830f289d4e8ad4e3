// Audio output using cpal
// Plays a fully decoded buffer on the default device and blocks until it has drained

use crate::adapters::resampler::{map_channels, Resampler};
use crate::domain::model::DecodedAudio;
use crate::domain::ports::AudioPlayer;
use crate::utils::error::{Result, StormError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);
// 最後一段樣本還在裝置緩衝區內
const DEVICE_TAIL: Duration = Duration::from_millis(250);
// 裝置啟動延遲與排程抖動的容許時間
const DRAIN_SLACK: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CpalPlayer {
    volume: f32,
}

impl CpalPlayer {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        samples: Arc<Vec<f32>>,
        cursor: Arc<AtomicUsize>,
        volume: f32,
        errors: Sender<String>,
    ) -> Result<Stream> {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let start = cursor.load(Ordering::Acquire);
                    for (offset, sample) in data.iter_mut().enumerate() {
                        let value = samples.get(start + offset).copied().unwrap_or(0.0) * volume;
                        *sample = T::from_sample(value);
                    }
                    cursor.store((start + data.len()).min(samples.len()), Ordering::Release);
                },
                move |err| {
                    tracing::error!("Audio output error: {}", err);
                    let _ = errors.send(err.to_string());
                },
                None,
            )
            .map_err(|e| StormError::PlaybackDeviceError {
                message: format!("Failed to build output stream: {}", e),
            })
    }
}

impl Default for CpalPlayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioPlayer for CpalPlayer {
    fn play(&self, audio: &DecodedAudio) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| StormError::PlaybackDeviceError {
                message: "No output device available".to_string(),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| StormError::PlaybackDeviceError {
                message: format!("Failed to get default output config: {}", e),
            })?;

        let device_rate = supported.sample_rate().0;
        let device_channels = supported.channels();
        tracing::debug!(
            "Output device: {} ({} Hz, {} channel(s), {:?})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            device_rate,
            device_channels,
            supported.sample_format()
        );

        let resampled = Resampler::resample(&audio.samples, audio.sample_rate, device_rate, audio.channels)?;
        let samples = Arc::new(map_channels(&resampled, audio.channels, device_channels));
        let cursor = Arc::new(AtomicUsize::new(0));
        let (errors_tx, errors_rx) = mpsc::channel();

        let config: StreamConfig = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, samples.clone(), cursor.clone(), self.volume, errors_tx.clone())?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, samples.clone(), cursor.clone(), self.volume, errors_tx.clone())?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, samples.clone(), cursor.clone(), self.volume, errors_tx.clone())?
            }
            format => {
                return Err(StormError::PlaybackDeviceError {
                    message: format!("Unsupported sample format: {:?}", format),
                })
            }
        };

        stream.play().map_err(|e| StormError::PlaybackDeviceError {
            message: format!("Failed to start stream: {}", e),
        })?;

        tracing::info!("🎵 Playing {:.1}s of audio", audio.duration_secs());

        let deadline = Duration::try_from_secs_f64(audio.duration_secs()).unwrap_or_default() + DRAIN_SLACK;
        let drained = wait_for_drain(&cursor, samples.len(), &errors_rx, deadline, DRAIN_POLL_INTERVAL);
        if drained.is_ok() {
            std::thread::sleep(DEVICE_TAIL);
        }

        drop(stream);
        drained?;
        tracing::debug!("Playback finished");
        Ok(())
    }
}

/// 等待輸出回呼消耗完所有樣本；串流回報錯誤或超過期限時失敗
fn wait_for_drain(
    cursor: &AtomicUsize,
    total: usize,
    errors: &Receiver<String>,
    deadline: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let started = Instant::now();

    while cursor.load(Ordering::Acquire) < total {
        if let Ok(message) = errors.try_recv() {
            return Err(StormError::PlaybackDeviceError {
                message: format!("Output stream failed during playback: {}", message),
            });
        }
        if started.elapsed() > deadline {
            return Err(StormError::PlaybackDeviceError {
                message: format!(
                    "Output device stopped consuming audio ({} of {} samples played)",
                    cursor.load(Ordering::Acquire),
                    total
                ),
            });
        }
        std::thread::sleep(poll_interval);
    }

    Ok(())
}
