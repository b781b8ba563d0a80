//! Audio output destinations.
//!
//! A synthesizer either plays its audio on a device ([`AudioOutput::DefaultSpeaker`])
//! or hands it to the caller ([`AudioOutput::Stream`]). Device playback goes through
//! an [`AudioSink`]; the cpal-backed speaker is only compiled with the `speaker`
//! feature.

#[cfg(feature = "speaker")]
mod playback;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::tts::{AudioData, TTSResult};

#[cfg(feature = "speaker")]
pub use playback::SpeakerSink;

/// Where a synthesizer delivers its audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutput {
    /// Play on the default output device.
    DefaultSpeaker,
    /// Keep the audio in the result for the caller to read.
    Stream,
}

/// A device that plays 16-bit PCM audio.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Plays `audio`, resolving once playback has finished.
    async fn play(&self, audio: AudioData) -> TTSResult<()>;
}

/// Returns the default speaker.
#[cfg(feature = "speaker")]
pub fn default_speaker() -> TTSResult<Arc<dyn AudioSink>> {
    Ok(Arc::new(SpeakerSink::new()))
}

/// Returns the default speaker.
#[cfg(not(feature = "speaker"))]
pub fn default_speaker() -> TTSResult<Arc<dyn AudioSink>> {
    Err(crate::core::tts::TTSError::InvalidConfiguration(
        "speaker playback requires the 'speaker' feature. Rebuild with --features speaker or pass --out"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "speaker"))]
    #[test]
    fn test_default_speaker_without_feature() {
        match default_speaker() {
            Err(crate::core::tts::TTSError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("speaker"));
            }
            Err(other) => panic!("Expected InvalidConfiguration error, got: {other:?}"),
            Ok(_) => panic!("Expected an error without the speaker feature"),
        }
    }
}
