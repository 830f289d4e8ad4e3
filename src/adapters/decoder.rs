// Audio decoder using Symphonia
// Decodes a whole file to interleaved f32 PCM

use crate::domain::model::DecodedAudio;
use crate::utils::error::{Result, StormError};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct AudioDecoder {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: Option<u32>,
    channels: Option<u16>,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let invalid = |reason: String| StormError::AudioSourceInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => invalid("file not found".to_string()),
            _ => invalid(format!("failed to open file: {}", e)),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // 用副檔名提示格式
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| invalid(format!("unsupported or corrupt audio: {}", e)))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| invalid("no audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate;
        let channels = track.codec_params.channels.map(|c| c.count() as u16);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| invalid(format!("no decoder for codec: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    /// Decode next packet, returns interleaved f32 samples
    /// Returns None when end of stream is reached
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(self.invalid(format!("failed to read packet: {}", e))),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    self.sample_rate.get_or_insert(spec.rate);
                    self.channels.get_or_insert(spec.channels.count() as u16);

                    let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    return Ok(Some(buffer.samples().to_vec()));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(StormError::AudioSourceInvalid {
                        path: self.path.clone(),
                        reason: format!("decode failed: {}", e),
                    })
                }
            }
        }
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn channels(&self) -> Option<u16> {
        self.channels
    }

    fn invalid(&self, reason: String) -> StormError {
        StormError::AudioSourceInvalid {
            path: self.path.clone(),
            reason,
        }
    }
}

/// 將整個檔案解碼到記憶體
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let mut decoder = AudioDecoder::open(path)?;
    let mut samples = Vec::new();

    while let Some(chunk) = decoder.decode_next()? {
        samples.extend_from_slice(&chunk);
    }

    let (sample_rate, channels) = match (decoder.sample_rate(), decoder.channels()) {
        (Some(rate), Some(channels)) if rate > 0 && channels > 0 => (rate, channels),
        _ => return Err(decoder.invalid("unknown sample rate or channel layout".to_string())),
    };

    if samples.is_empty() {
        return Err(decoder.invalid("no audio frames decoded".to_string()));
    }

    let audio = DecodedAudio {
        samples,
        sample_rate,
        channels,
    };

    tracing::debug!(
        "Decoded {}: {} frames, {} Hz, {} channel(s), {:.1}s",
        path.display(),
        audio.frames(),
        audio.sample_rate,
        audio.channels,
        audio.duration_secs()
    );

    Ok(audio)
}
