pub mod audio;
pub mod providers;
pub mod report;
pub mod runner;
pub mod tts;

// Re-export commonly used types for convenience
pub use audio::{AudioOutput, AudioSink};
pub use report::StatusReporter;
pub use runner::{RunSummary, RunnerOptions, SynthesisRunner};
pub use tts::{
    AudioDataStream, AzureSynthesizerFactory, SpeechSettings, SpeechSynthesizer,
    SynthesizerFactory, TTSError, TTSResult,
};
