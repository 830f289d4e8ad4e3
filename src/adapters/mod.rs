// Adapters layer: concrete implementations for external systems (weather API, audio files, output device).

pub mod decoder;
#[cfg(feature = "playback")]
pub mod output;
pub mod resampler;
pub mod wav;
pub mod weather;
