use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: "Honolulu, HI".to_string(),
            latitude: 21.3069,
            longitude: -157.8583,
            timezone: "Pacific/Honolulu".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Rain,
    NotRain,
}

/// One observation of current conditions, used once and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: String,
    pub rain_mm: f64,
    pub precipitation_mm: f64,
    pub observed_at: Option<NaiveDateTime>,
    pub condition: Condition,
}

impl WeatherReading {
    /// 任何降雨量或降水量大於 0 即視為下雨
    pub fn from_measurements(
        location: impl Into<String>,
        rain_mm: f64,
        precipitation_mm: f64,
        observed_at: Option<NaiveDateTime>,
    ) -> Self {
        let condition = if rain_mm > 0.0 || precipitation_mm > 0.0 {
            Condition::Rain
        } else {
            Condition::NotRain
        };

        Self {
            location: location.into(),
            rain_mm,
            precipitation_mm,
            observed_at,
            condition,
        }
    }

    pub fn is_raining(&self) -> bool {
        self.condition == Condition::Rain
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub proceed: bool,
}

/// Interleaved PCM samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Override,
    Weather(WeatherReading),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackOutcome {
    pub played: bool,
    pub exported: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Skipped { reading: WeatherReading },
    Played { trigger: Trigger, exported: Option<PathBuf> },
    DryRun { trigger: Trigger, would_play: bool },
}
