//! Sample rate and channel conversion for the output device.

use crate::utils::error::{Result, StormError};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};

pub struct Resampler;

impl Resampler {
    /// Resample interleaved audio from `input_rate` to `output_rate`.
    ///
    /// Returns a copy when the rates already match.
    pub fn resample(input: &[f32], input_rate: u32, output_rate: u32, channels: u16) -> Result<Vec<f32>> {
        if input_rate == output_rate || input.is_empty() {
            return Ok(input.to_vec());
        }

        if channels == 0 {
            return Err(StormError::PlaybackDeviceError {
                message: "Cannot resample audio with zero channels".to_string(),
            });
        }

        tracing::debug!(
            "Resampling from {}Hz to {}Hz ({} channels)",
            input_rate,
            output_rate,
            channels
        );

        let planar_input = Self::deinterleave(input, channels);
        let input_frames = planar_input[0].len();

        let mut resampler = FastFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            1.0,
            PolynomialDegree::Septic,
            input_frames,
            channels as usize,
        )
        .map_err(|e| StormError::PlaybackDeviceError {
            message: format!("Failed to create resampler: {}", e),
        })?;

        let planar_output = resampler
            .process(&planar_input, None)
            .map_err(|e| StormError::PlaybackDeviceError {
                message: format!("Resampling failed: {}", e),
            })?;

        Ok(Self::interleave(planar_output))
    }

    /// Input:  [L, R, L, R, ...]
    /// Output: [[L, L, ...], [R, R, ...]]
    fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
        let num_channels = channels as usize;
        let num_frames = samples.len() / num_channels;

        let mut planar = vec![Vec::with_capacity(num_frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch_idx, &sample) in frame.iter().enumerate() {
                planar[ch_idx].push(sample);
            }
        }

        planar
    }

    fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
        if planar.is_empty() {
            return Vec::new();
        }

        let num_channels = planar.len();
        let num_frames = planar[0].len();
        let mut interleaved = Vec::with_capacity(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for channel in &planar {
                interleaved.push(channel[frame_idx]);
            }
        }

        interleaved
    }
}

/// Convert interleaved audio between channel counts.
///
/// Mono is duplicated to every output channel; going down to mono averages
/// the input channels. Otherwise channels are copied by index and extra
/// output channels are left silent.
pub fn map_channels(input: &[f32], input_channels: u16, output_channels: u16) -> Vec<f32> {
    if input_channels == output_channels || input_channels == 0 || output_channels == 0 {
        return input.to_vec();
    }

    let in_ch = input_channels as usize;
    let out_ch = output_channels as usize;
    let mut output = Vec::with_capacity(input.len() / in_ch * out_ch);

    for frame in input.chunks_exact(in_ch) {
        if in_ch == 1 {
            output.extend(std::iter::repeat(frame[0]).take(out_ch));
        } else if out_ch == 1 {
            output.push(frame.iter().sum::<f32>() / in_ch as f32);
        } else {
            for ch in 0..out_ch {
                output.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }

    output
}
