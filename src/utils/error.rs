use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StormError {
    #[error("Weather source unavailable: {message}")]
    WeatherUnavailable { message: String },

    #[error("Invalid audio source '{}': {reason}", .path.display())]
    AudioSourceInvalid { path: PathBuf, reason: String },

    #[error("Audio output device error: {message}")]
    PlaybackDeviceError { message: String },

    #[error("Failed to export audio to '{}': {message}", .path.display())]
    ExportError { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Weather,
    AudioSource,
    Output,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl StormError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StormError::WeatherUnavailable { .. } => ErrorCategory::Weather,
            StormError::AudioSourceInvalid { .. } => ErrorCategory::AudioSource,
            StormError::PlaybackDeviceError { .. } | StormError::ExportError { .. } => {
                ErrorCategory::Output
            }
            StormError::ConfigError { .. }
            | StormError::ConfigValidationError { .. }
            | StormError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            StormError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 天氣查詢失敗：下次執行可能就恢復
            ErrorCategory::Weather => ErrorSeverity::Medium,
            ErrorCategory::AudioSource | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定行程退出碼（2 保留給 clap 的用法錯誤）
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 4,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            StormError::WeatherUnavailable { .. } => {
                "Check your network connection or the weather endpoint, or pass --audio to play without a weather check".to_string()
            }
            StormError::AudioSourceInvalid { path, .. } => format!(
                "Make sure '{}' exists and is a supported audio file (mp3, flac, ogg, wav, m4a)",
                path.display()
            ),
            StormError::PlaybackDeviceError { .. } => {
                "Make sure an audio output device is connected and not in exclusive use".to_string()
            }
            StormError::ExportError { path, .. } => format!(
                "Check that the directory for '{}' is writable and has free space",
                path.display()
            ),
            StormError::IoError(_) => "Check file permissions and available disk space".to_string(),
            StormError::ConfigError { .. } | StormError::ConfigValidationError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            StormError::InvalidConfigValueError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StormError::WeatherUnavailable { .. } => {
                format!("Could not check the weather, nothing was played ({})", self)
            }
            StormError::AudioSourceInvalid { path, reason } => {
                format!("Cannot play '{}': {}", path.display(), reason)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StormError>;
