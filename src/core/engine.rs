use crate::core::dispatcher::PlaybackDispatcher;
use crate::core::evaluator::ConditionEvaluator;
use crate::domain::model::{PlaybackRequest, RunOutcome, Trigger};
use crate::domain::ports::{AudioPlayer, ConditionSource};
use crate::utils::error::Result;
use std::path::PathBuf;

/// What the user asked for on this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub audio: PathBuf,
    pub out: Option<PathBuf>,
    pub forced: bool,
    pub dry_run: bool,
}

pub struct StormEngine<S: ConditionSource, P: AudioPlayer> {
    evaluator: ConditionEvaluator<S>,
    dispatcher: PlaybackDispatcher<P>,
}

impl<S: ConditionSource, P: AudioPlayer> StormEngine<S, P> {
    pub fn new(evaluator: ConditionEvaluator<S>, dispatcher: PlaybackDispatcher<P>) -> Self {
        Self {
            evaluator,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &PlaybackDispatcher<P> {
        &self.dispatcher
    }

    /// One evaluate-then-act pass.
    pub async fn run(&self, invocation: &Invocation) -> Result<RunOutcome> {
        let trigger = if invocation.forced {
            tracing::info!("⏭️ Override in effect, skipping weather check");
            Trigger::Override
        } else {
            match self.evaluator.evaluate().await {
                Ok(reading) => Trigger::Weather(reading),
                Err(e) => {
                    tracing::warn!(
                        "Weather check for {} failed, not playing: {}",
                        self.evaluator.location().name,
                        e
                    );
                    return Err(e);
                }
            }
        };

        let proceed = match &trigger {
            Trigger::Override => true,
            Trigger::Weather(reading) => reading.is_raining(),
        };

        if invocation.dry_run {
            tracing::info!("🔍 DRY RUN - would play: {}", proceed);
            return Ok(RunOutcome::DryRun {
                trigger,
                would_play: proceed,
            });
        }

        let request = PlaybackRequest {
            source: invocation.audio.clone(),
            destination: invocation.out.clone(),
            proceed,
        };
        let outcome = self.dispatcher.dispatch(&request)?;

        match trigger {
            Trigger::Weather(reading) if !outcome.played => {
                tracing::info!("☀️ No rain in {}, nothing to play", reading.location);
                Ok(RunOutcome::Skipped { reading })
            }
            trigger => Ok(RunOutcome::Played {
                trigger,
                exported: outcome.exported,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DecodedAudio, Location, WeatherReading};
    use crate::utils::error::StormError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedSource {
        rain_mm: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ConditionSource for ScriptedSource {
        async fn current(&self, location: &Location) -> Result<WeatherReading> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rain_mm
                .map(|rain| WeatherReading::from_measurements(location.name.clone(), rain, 0.0, None))
                .ok_or_else(|| StormError::WeatherUnavailable {
                    message: "timed out".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct CountingPlayer {
        plays: AtomicUsize,
    }

    impl AudioPlayer for CountingPlayer {
        fn play(&self, _audio: &DecodedAudio) -> Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn engine(rain_mm: Option<f64>) -> (StormEngine<ScriptedSource, CountingPlayer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource {
            rain_mm,
            calls: calls.clone(),
        };
        let engine = StormEngine::new(
            ConditionEvaluator::new(source, Location::default()),
            PlaybackDispatcher::new(CountingPlayer::default()),
        );
        (engine, calls)
    }

    fn invocation(forced: bool, dry_run: bool) -> Invocation {
        Invocation {
            audio: PathBuf::from("missing/track.mp3"),
            out: None,
            forced,
            dry_run,
        }
    }

    #[tokio::test]
    async fn test_dry_weather_skips() {
        let (engine, calls) = engine(Some(0.0));
        let outcome = engine.run(&invocation(false, false)).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Skipped { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.dispatcher().player().plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_weather_failure_without_override_is_error() {
        let (engine, _) = engine(None);
        let result = engine.run(&invocation(false, false)).await;

        assert!(matches!(result, Err(StormError::WeatherUnavailable { .. })));
        assert_eq!(engine.dispatcher().player().plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_override_never_queries_weather() {
        let (engine, calls) = engine(None);
        let result = engine.run(&invocation(true, true)).await.unwrap();

        assert_eq!(
            result,
            RunOutcome::DryRun {
                trigger: Trigger::Override,
                would_play: true
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dry_run_reports_rain_without_playing() {
        let (engine, _) = engine(Some(2.0));
        let outcome = engine.run(&invocation(false, true)).await.unwrap();

        match outcome {
            RunOutcome::DryRun { trigger: Trigger::Weather(reading), would_play } => {
                assert!(would_play);
                assert!(reading.is_raining());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(engine.dispatcher().player().plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rain_with_missing_track_is_audio_error() {
        let (engine, _) = engine(Some(0.5));
        let result = engine.run(&invocation(false, false)).await;

        assert!(matches!(result, Err(StormError::AudioSourceInvalid { .. })));
    }
}
