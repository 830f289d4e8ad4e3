use crate::domain::model::Location;
use crate::utils::error::{Result, StormError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "storm-player.toml";
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_AUDIO_SOURCE: &str = "assets/song_of_storms.mp3";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub location: Location,
    pub weather: WeatherConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub default_source: PathBuf,
    pub output_dir: PathBuf,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_source: PathBuf::from(DEFAULT_AUDIO_SOURCE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            volume: 1.0,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| StormError::ConfigError {
            message: format!("Failed to read '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StormError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORM_LATITUDE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StormError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("location.name", &self.location.name)?;
        validation::validate_range("location.latitude", self.location.latitude, -90.0, 90.0)?;
        validation::validate_range("location.longitude", self.location.longitude, -180.0, 180.0)?;
        validation::validate_non_empty_string("location.timezone", &self.location.timezone)?;

        validation::validate_url("weather.endpoint", &self.weather.endpoint)?;
        validation::validate_positive_number("weather.timeout_seconds", self.weather.timeout_seconds, 1)?;

        validation::validate_path("audio.default_source", &self.audio.default_source)?;
        validation::validate_path("audio.output_dir", &self.audio.output_dir)?;
        validation::validate_range("audio.volume", self.audio.volume, 0.0, 1.0)?;

        Ok(())
    }
}
