//! # Synthesis boundary
//!
//! This module defines the seam between the command-line orchestrator and the
//! speech service. A [`SpeechSynthesizer`] turns text into audio and reports
//! lifecycle notifications to a registered [`SynthesisEventHandler`]; a
//! [`SynthesizerFactory`] builds synthesizers from [`SpeechSettings`].
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use azure_speech_cli::core::audio::AudioOutput;
//! use azure_speech_cli::core::tts::{AzureSynthesizerFactory, SpeechSettings, SynthesizerFactory};
//!
//! let settings = SpeechSettings {
//!     endpoint: Some("https://eastus.api.cognitive.microsoft.com/sts/v1.0/issuetoken".into()),
//!     subscription_key: "your-key".into(),
//!     voice_name: Some("en-US-JennyNeural".into()),
//!     ..Default::default()
//! };
//!
//! let synthesizer = AzureSynthesizerFactory.create_synthesizer(&settings, AudioOutput::Stream)?;
//! let result = synthesizer.speak_text("Hello, world!").await?;
//! println!("{} bytes", result.audio_data.len());
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::core::audio::AudioOutput;

/// Audio data handed to an output device.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// 16-bit little-endian mono PCM
    pub data: Vec<u8>,
    /// Sample rate of the audio
    pub sample_rate: u32,
    /// Duration of the audio in milliseconds, when it can be derived
    pub duration_ms: Option<u32>,
}

impl AudioData {
    /// Wraps 16-bit little-endian mono PCM and derives its duration.
    pub fn pcm16(data: Vec<u8>, sample_rate: u32) -> Self {
        let samples = (data.len() / 2) as u64;
        let duration_ms = if sample_rate > 0 {
            Some(((samples * 1000) / sample_rate as u64) as u32)
        } else {
            None
        };

        Self {
            data,
            sample_rate,
            duration_ms,
        }
    }
}

/// Why a synthesis was canceled.
///
/// Discriminants match the numeric codes printed by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The service or transport reported an error.
    Error = 1,
    /// The end of the audio stream was reached.
    EndOfStream = 2,
    /// The request was canceled by the caller.
    CancelledByUser = 3,
}

impl CancellationReason {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Error code attached to a cancellation with reason [`CancellationReason::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationErrorCode {
    NoError = 0,
    AuthenticationFailure = 1,
    BadRequest = 2,
    TooManyRequests = 3,
    Forbidden = 4,
    ConnectionFailure = 5,
    ServiceTimeout = 6,
    ServiceError = 7,
    ServiceUnavailable = 8,
    RuntimeError = 9,
}

impl CancellationErrorCode {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps an HTTP status returned by the service to an error code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => Self::NoError,
            400 => Self::BadRequest,
            401 => Self::AuthenticationFailure,
            403 => Self::Forbidden,
            408 => Self::ServiceTimeout,
            429 => Self::TooManyRequests,
            503 => Self::ServiceUnavailable,
            500..=599 => Self::ServiceError,
            _ => Self::RuntimeError,
        }
    }
}

/// Cancellation descriptor of a synthesis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationDetails {
    pub reason: CancellationReason,
    pub error_code: CancellationErrorCode,
    pub error_details: String,
}

impl CancellationDetails {
    /// A cancellation caused by an error.
    pub fn error(error_code: CancellationErrorCode, error_details: impl Into<String>) -> Self {
        Self {
            reason: CancellationReason::Error,
            error_code,
            error_details: error_details.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.reason == CancellationReason::Error
    }
}

impl fmt::Display for CancellationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reason={:?}, error_code={:?}, details=[{}]",
            self.reason, self.error_code, self.error_details
        )
    }
}

/// Synthesis error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum TTSError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Audio generation failed: {0}")]
    AudioGenerationFailed(String),

    #[error("Audio output failed: {0}")]
    AudioOutputFailed(String),

    #[error("Synthesis canceled: {0}")]
    Canceled(CancellationDetails),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for synthesis operations
pub type TTSResult<T> = Result<T, TTSError>;

/// Outcome of a single synthesis request.
pub type SynthesisOutcome = TTSResult<SynthesisResult>;

/// Receiving half of a live audio stream.
pub type AudioChunkReceiver = mpsc::Receiver<TTSResult<Bytes>>;

/// Reason attached to a [`SynthesisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultReason {
    /// Audio started arriving; the rest is pulled through an audio data stream.
    SynthesizingAudioStarted,
    /// All audio was synthesized.
    SynthesizingAudioCompleted,
    /// The request was canceled, see [`SynthesisResult::cancellation`].
    Canceled,
}

/// Terminal result of one synthesis request.
#[derive(Debug)]
pub struct SynthesisResult {
    pub result_id: String,
    pub reason: ResultReason,
    /// Synthesized audio. Empty for started and canceled results.
    pub audio_data: Vec<u8>,
    pub cancellation: Option<CancellationDetails>,
    audio_stream: Option<AudioChunkReceiver>,
}

impl SynthesisResult {
    /// A completed result carrying the full audio payload.
    pub fn completed(audio_data: Vec<u8>) -> Self {
        Self {
            result_id: new_result_id(),
            reason: ResultReason::SynthesizingAudioCompleted,
            audio_data,
            cancellation: None,
            audio_stream: None,
        }
    }

    /// A canceled result.
    pub fn canceled(details: CancellationDetails) -> Self {
        Self {
            result_id: new_result_id(),
            reason: ResultReason::Canceled,
            audio_data: Vec::new(),
            cancellation: Some(details),
            audio_stream: None,
        }
    }

    /// A result whose audio is still arriving through `receiver`.
    pub fn started(receiver: AudioChunkReceiver) -> Self {
        Self {
            result_id: new_result_id(),
            reason: ResultReason::SynthesizingAudioStarted,
            audio_data: Vec::new(),
            cancellation: None,
            audio_stream: Some(receiver),
        }
    }

    /// Overrides the generated result id.
    pub fn with_result_id(mut self, result_id: impl Into<String>) -> Self {
        self.result_id = result_id.into();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.reason == ResultReason::SynthesizingAudioCompleted
    }

    pub fn is_canceled(&self) -> bool {
        self.reason == ResultReason::Canceled
    }

    /// Takes the live audio channel, if this result still owns one.
    pub(crate) fn take_audio_stream(&mut self) -> Option<AudioChunkReceiver> {
        self.audio_stream.take()
    }
}

pub(crate) fn new_result_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Payload of a lifecycle notification.
///
/// Each hook receives its own copy and drops it when done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisEventArgs {
    pub result_id: String,
    /// Size of the chunk that triggered a `synthesizing` notification.
    pub audio_chunk_len: usize,
    /// Total audio length for `completed` notifications.
    pub audio_len: usize,
    pub cancellation: Option<CancellationDetails>,
}

/// Observer of synthesis lifecycle notifications.
pub trait SynthesisEventHandler: Send + Sync {
    /// Called when the service accepted the request and audio is about to arrive
    fn on_synthesis_started(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Called for every audio chunk received while synthesizing
    fn on_synthesizing(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Called once all audio has been received
    fn on_synthesis_completed(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Called when synthesis was canceled
    fn on_synthesis_canceled(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Settings a synthesizer is built from.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct SpeechSettings {
    /// Service endpoint URL
    pub endpoint: Option<String>,
    /// Region, used when no endpoint is given
    pub region: Option<String>,
    /// Subscription key for the speech resource
    pub subscription_key: String,
    /// Voice name, e.g. "zh-CN-XiaomoNeural"
    pub voice_name: Option<String>,
    /// Output format name, e.g. "riff-24khz-16bit-mono-pcm"
    pub output_format: Option<String>,
    /// Speaking rate multiplier (0.5 to 2.0, 1.0 is normal)
    pub speaking_rate: Option<f32>,
}

/// A text-to-speech synthesizer.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and waits until all audio has been received.
    ///
    /// The audio stays in the result. Service-side failures are reported as a
    /// [`ResultReason::Canceled`] result; `Err` is reserved for failures of the
    /// synthesizer itself.
    async fn synthesize_text(&self, text: &str) -> SynthesisOutcome;

    /// Plays a completed result on the output the synthesizer was created with.
    ///
    /// Synthesizers without a playback device leave the audio untouched.
    async fn play(&self, _result: &SynthesisResult) -> TTSResult<()> {
        Ok(())
    }

    /// Synthesizes `text` and plays it before returning.
    async fn speak_text(&self, text: &str) -> SynthesisOutcome {
        let result = self.synthesize_text(text).await?;
        if result.is_completed() {
            self.play(&result).await?;
        }
        Ok(result)
    }

    /// Starts synthesizing `text`.
    ///
    /// Resolves as soon as audio starts arriving. The remaining audio is read
    /// through an [`AudioDataStream`](super::AudioDataStream) built from the result.
    async fn start_speaking_text(&self, text: &str) -> SynthesisOutcome;

    /// Registers the lifecycle observer, replacing any previous one.
    fn set_event_handler(&mut self, handler: Arc<dyn SynthesisEventHandler>);

    /// Get provider-specific information
    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "unknown",
            "version": "1.0.0"
        })
    }
}

/// Boxed synthesizer trait object
pub type BoxedSynthesizer = Box<dyn SpeechSynthesizer>;

/// Factory for provider-specific synthesizers.
pub trait SynthesizerFactory: Send + Sync {
    /// Builds a synthesizer.
    ///
    /// Rejected settings surface as [`TTSError::InvalidConfiguration`].
    fn create_synthesizer(
        &self,
        settings: &SpeechSettings,
        output: AudioOutput,
    ) -> TTSResult<BoxedSynthesizer>;
}
