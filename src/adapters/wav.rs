use crate::domain::model::DecodedAudio;
use crate::utils::error::{Result, StormError};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes decoded audio as 16-bit PCM WAV.
#[derive(Debug, Clone, Default)]
pub struct WavExporter;

impl WavExporter {
    pub fn new() -> Self {
        Self
    }

    /// 先寫入同目錄的暫存檔再改名，目標檔要嘛完整、要嘛不存在
    pub fn export(&self, audio: &DecodedAudio, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let partial = Self::partial_path(destination);
        tracing::debug!("Writing WAV data to {}", partial.display());

        if let Err(e) = Self::write_wav(audio, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(StormError::ExportError {
                path: destination.to_path_buf(),
                message: e.to_string(),
            });
        }

        // rename 會覆蓋既有的目標檔
        if let Err(e) = fs::rename(&partial, destination) {
            let _ = fs::remove_file(&partial);
            return Err(StormError::ExportError {
                path: destination.to_path_buf(),
                message: e.to_string(),
            });
        }

        tracing::debug!("WAV file saved to {}", destination.display());
        Ok(())
    }

    fn write_wav(audio: &DecodedAudio, path: &Path) -> std::result::Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &audio.samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
        Ok(())
    }

    fn partial_path(destination: &Path) -> PathBuf {
        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export.wav".to_string());
        destination.with_file_name(format!(".{}.partial", file_name))
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_audio(value: f32) -> DecodedAudio {
        DecodedAudio {
            samples: vec![value; 800],
            sample_rate: 8000,
            channels: 2,
        }
    }

    fn read_samples(path: &Path) -> (hound::WavSpec, Vec<i16>) {
        let mut reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn test_export_writes_wav() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("nested").join("storm.wav");

        WavExporter::new().export(&sample_audio(0.5), &destination).unwrap();

        let (spec, samples) = read_samples(&destination);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(samples.len(), 800);
        assert!(samples.iter().all(|&s| s == 16384));
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("storm.wav");
        std::fs::write(&destination, b"stale contents").unwrap();

        let exporter = WavExporter::new();
        exporter.export(&sample_audio(0.25), &destination).unwrap();
        exporter.export(&sample_audio(-0.25), &destination).unwrap();

        let (_, samples) = read_samples(&destination);
        assert_eq!(samples.len(), 800);
        assert!(samples.iter().all(|&s| s == -8192));
    }

    #[test]
    fn test_no_partial_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("storm.wav");

        WavExporter::new().export(&sample_audio(0.1), &destination).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["storm.wav".to_string()]);
    }

    #[test]
    fn test_sample_conversion_clamps() {
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(-1.0), i16::MIN);
        assert_eq!(to_i16(2.5), i16::MAX);
        assert_eq!(to_i16(0.0), 0);
    }
}
