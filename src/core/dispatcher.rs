use crate::adapters::decoder;
use crate::adapters::wav::WavExporter;
use crate::domain::model::{PlaybackOutcome, PlaybackRequest};
use crate::domain::ports::AudioPlayer;
use crate::utils::error::Result;

pub struct PlaybackDispatcher<P: AudioPlayer> {
    player: P,
    exporter: WavExporter,
}

impl<P: AudioPlayer> PlaybackDispatcher<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            exporter: WavExporter::new(),
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Play the request's source and optionally export it.
    ///
    /// A request with `proceed == false` has no side effects. The source is
    /// fully decoded before anything is played or written, so an invalid
    /// source never leaves a file at the destination.
    pub fn dispatch(&self, request: &PlaybackRequest) -> Result<PlaybackOutcome> {
        if !request.proceed {
            tracing::debug!("Nothing to play");
            return Ok(PlaybackOutcome::default());
        }

        tracing::info!("🎧 Loading {}", request.source.display());
        let audio = decoder::decode_file(&request.source)?;

        self.player.play(&audio)?;

        let exported = match &request.destination {
            Some(destination) => {
                self.exporter.export(&audio, destination)?;
                tracing::info!("💾 Saved WAV copy to {}", destination.display());
                Some(destination.clone())
            }
            None => None,
        };

        Ok(PlaybackOutcome {
            played: true,
            exported,
        })
    }
}
