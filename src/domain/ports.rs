use crate::domain::model::{DecodedAudio, Location, WeatherReading};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where current conditions come from.
#[async_trait]
pub trait ConditionSource: Send + Sync {
    async fn current(&self, location: &Location) -> Result<WeatherReading>;
}

/// Sends decoded audio to an output device.
pub trait AudioPlayer {
    fn play(&self, audio: &DecodedAudio) -> Result<()>;
}
