pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, RunSettings};

#[cfg(feature = "playback")]
pub use adapters::output::CpalPlayer;
pub use adapters::weather::OpenMeteoSource;

pub use crate::core::{
    dispatcher::PlaybackDispatcher,
    engine::{Invocation, StormEngine},
    evaluator::ConditionEvaluator,
};
pub use domain::model::{DecodedAudio, Location, RunOutcome, Trigger, WeatherReading};
pub use domain::ports::{AudioPlayer, ConditionSource};
pub use utils::error::{Result, StormError};
