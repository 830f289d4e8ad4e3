pub mod toml_config;

use crate::core::engine::Invocation;
use crate::domain::model::Location;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
use toml_config::{TomlConfig, WeatherConfig, DEFAULT_CONFIG_FILE};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "storm-player")]
#[command(about = "Plays your storm track when it's raining at your location")]
pub struct CliConfig {
    /// Audio file to play; forces playback regardless of the weather
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Also write a decoded WAV copy here (relative paths go under the output directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Play the configured default track without checking the weather
    #[arg(long)]
    pub force: bool,

    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    #[arg(long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub location_name: Option<String>,

    /// Override the weather API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Check the weather and report the decision without playing anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 未指定 --config 時，預設檔不存在就使用內建預設值
    pub fn load_file_config(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => TomlConfig::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(TomlConfig::default()),
        }
    }

    /// 將命令列覆蓋套用到檔案配置
    pub fn apply_overrides(&self, mut file: TomlConfig) -> TomlConfig {
        if let Some(latitude) = self.latitude {
            file.location.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            file.location.longitude = longitude;
        }
        if let Some(timezone) = &self.timezone {
            file.location.timezone = timezone.clone();
        }
        if let Some(name) = &self.location_name {
            file.location.name = name.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            file.weather.endpoint = endpoint.clone();
        }
        file
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(audio) = &self.audio {
            validation::validate_path("audio", audio)?;
        }
        if let Some(out) = &self.out {
            validation::validate_path("out", out)?;
            validation::validate_file_extension("out", out, &["wav"])?;
        }
        if let Some(endpoint) = &self.endpoint {
            validation::validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}

/// Everything one run needs, after merging the config file and the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub location: Location,
    pub weather: WeatherConfig,
    pub volume: f32,
    pub invocation: Invocation,
}

impl RunSettings {
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig, file: TomlConfig) -> Result<Self> {
        cli.validate()?;

        let file = cli.apply_overrides(file);
        file.validate()?;

        let forced = cli.audio.is_some() || cli.force;
        let audio = cli
            .audio
            .clone()
            .unwrap_or_else(|| file.audio.default_source.clone());
        let out = cli
            .out
            .as_deref()
            .map(|out| resolve_output_path(&file.audio.output_dir, out));

        Ok(Self {
            location: file.location,
            weather: file.weather,
            volume: file.audio.volume,
            invocation: Invocation {
                audio,
                out,
                forced,
                dry_run: cli.dry_run,
            },
        })
    }
}

/// 相對路徑一律放到輸出目錄下
pub fn resolve_output_path(output_dir: &Path, out: &Path) -> PathBuf {
    if out.is_absolute() {
        out.to_path_buf()
    } else {
        output_dir.join(out)
    }
}
