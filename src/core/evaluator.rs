use crate::domain::model::{Location, WeatherReading};
use crate::domain::ports::ConditionSource;
use crate::utils::error::Result;

/// Reduces the current weather at one location to a play / don't-play signal.
pub struct ConditionEvaluator<S: ConditionSource> {
    source: S,
    location: Location,
}

impl<S: ConditionSource> ConditionEvaluator<S> {
    pub fn new(source: S, location: Location) -> Self {
        Self { source, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// 單次查詢，不重試
    pub async fn evaluate(&self) -> Result<WeatherReading> {
        tracing::debug!(
            "Checking weather for {} ({}, {})",
            self.location.name,
            self.location.latitude,
            self.location.longitude
        );
        self.source.current(&self.location).await
    }

    pub async fn should_play(&self) -> Result<bool> {
        Ok(self.evaluate().await?.is_raining())
    }
}
