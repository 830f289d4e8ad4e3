pub mod dispatcher;
pub mod engine;
pub mod evaluator;

pub use crate::domain::model::{PlaybackOutcome, PlaybackRequest, RunOutcome, Trigger, WeatherReading};
pub use crate::domain::ports::{AudioPlayer, ConditionSource};
pub use crate::utils::error::Result;
