pub mod azure;
mod base;
pub mod events;
pub mod stream;

pub use azure::{AzureAudioEncoding, AzureSpeechConfig, AzureSynthesizer, AzureSynthesizerFactory};
pub use base::{
    AudioChunkReceiver, AudioData, BoxedSynthesizer, CancellationDetails, CancellationErrorCode,
    CancellationReason, ResultReason, SpeechSettings, SpeechSynthesizer, SynthesisEventArgs,
    SynthesisEventHandler, SynthesisOutcome, SynthesisResult, SynthesizerFactory, TTSError,
    TTSResult,
};
pub use events::ConsoleEventLogger;
pub use stream::{AUDIO_READ_CHUNK_SIZE, AudioDataStream};
