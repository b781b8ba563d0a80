//! The request loop.
//!
//! [`SynthesisRunner`] builds one synthesizer, registers the console observer
//! and submits the text `repeat` times. Without an output path the audio goes
//! to the default speaker. With one, it is pulled through an
//! [`AudioDataStream`] and written to the file.
//!
//! The timeout covers the service outcome of each iteration: the full response
//! on the speaker path, the start of the audio stream on the capture path.
//! Playback and draining run outside it. A timeout ends the run.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::core::audio::AudioOutput;
use crate::core::report::StatusReporter;
use crate::core::tts::azure::AzureAudioEncoding;
use crate::core::tts::{
    AudioDataStream, BoxedSynthesizer, CancellationDetails, CancellationErrorCode,
    ConsoleEventLogger, SpeechSettings, SpeechSynthesizer, SynthesisResult, SynthesizerFactory,
    TTSError, TTSResult,
};
use crate::errors::{SpeechCliError, SpeechCliResult};

/// Options of the request loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Time allowed for the service to produce an outcome
    pub timeout: Duration,
    /// Number of iterations, 0 runs until an error or timeout ends the loop
    pub repeat: u32,
    /// Output file; selects the capture path
    pub out: Option<PathBuf>,
    /// Write captured audio to `out`
    pub save_audio: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            repeat: 1,
            out: None,
            save_audio: true,
        }
    }
}

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub completed: u64,
    pub canceled: u64,
    /// Bytes read from audio data streams across all iterations
    pub bytes_read: u64,
}

/// Outcome of one capture iteration.
enum Captured {
    Audio { audio: Vec<u8>, bytes_read: usize },
    Canceled(CancellationDetails),
}

/// Runs synthesis requests and prints their status lines.
pub struct SynthesisRunner {
    factory: Arc<dyn SynthesizerFactory>,
    reporter: StatusReporter,
    options: RunnerOptions,
}

impl SynthesisRunner {
    pub fn new(
        factory: Arc<dyn SynthesizerFactory>,
        reporter: StatusReporter,
        options: RunnerOptions,
    ) -> Self {
        Self {
            factory,
            reporter,
            options,
        }
    }

    /// Synthesizes `text` according to the runner options.
    ///
    /// # Errors
    /// - `Validation` for empty text, before any synthesizer is created
    /// - `Configuration` when the factory rejects the settings
    /// - `Timeout` when an iteration does not finish in time
    /// - `Synthesis` when the synthesizer fails
    /// - `Cancellation` when the capture path receives a canceled result
    /// - `Io` when the output file can not be written
    pub async fn run(&self, text: &str, settings: &SpeechSettings) -> SpeechCliResult<RunSummary> {
        if text.is_empty() {
            return Err(SpeechCliError::Validation("text can not be null".to_string()));
        }

        match self.options.out.clone() {
            None => self.run_to_speaker(text, settings).await,
            Some(path) => self.run_to_stream(text, settings, &path).await,
        }
    }

    /// Plays every iteration on the default speaker.
    ///
    /// Canceled results are reported and the loop continues.
    pub async fn run_to_speaker(
        &self,
        text: &str,
        settings: &SpeechSettings,
    ) -> SpeechCliResult<RunSummary> {
        // The speaker plays raw PCM whatever format was configured for files
        let settings = SpeechSettings {
            output_format: None,
            ..settings.clone()
        };
        let synthesizer = self.create_synthesizer(&settings, AudioOutput::DefaultSpeaker)?;

        let mut summary = RunSummary::default();
        while self.should_continue(summary.iterations) {
            summary.iterations += 1;
            debug!(iteration = summary.iterations, "Speaking to the default speaker");

            let outcome = self.with_timeout(synthesizer.synthesize_text(text)).await?;
            match outcome {
                Ok(result) if result.is_completed() => {
                    synthesizer
                        .play(&result)
                        .await
                        .map_err(|e| self.report_error(e))?;
                    self.reporter
                        .line(format!("Speech synthesized to speaker for text [{text}]."));
                    summary.completed += 1;
                }
                Ok(result) => {
                    self.report_cancellation(&cancellation_of(result));
                    summary.canceled += 1;
                }
                Err(e) => return Err(self.report_error(e)),
            }
        }

        info!(?summary, "Speaker run finished");
        Ok(summary)
    }

    /// Pulls every iteration through an audio data stream into `path`.
    ///
    /// A canceled result ends the run with a `Cancellation` error.
    pub async fn run_to_stream(
        &self,
        text: &str,
        settings: &SpeechSettings,
        path: &Path,
    ) -> SpeechCliResult<RunSummary> {
        let mut settings = settings.clone();
        if settings.output_format.is_none() {
            let format = AzureAudioEncoding::from_output_path(path);
            debug!("Inferred output format {} from {}", format.as_str(), path.display());
            settings.output_format = Some(format.as_str().to_string());
        }
        let synthesizer = self.create_synthesizer(&settings, AudioOutput::Stream)?;

        let mut summary = RunSummary::default();
        while self.should_continue(summary.iterations) {
            summary.iterations += 1;
            debug!(iteration = summary.iterations, "Capturing audio stream");

            let outcome = self.with_timeout(synthesizer.start_speaking_text(text)).await?;

            let captured = match outcome {
                Ok(result) => drain(result).await,
                Err(e) => Err(e),
            };
            let (audio, bytes_read) = match captured {
                Ok(Captured::Audio { audio, bytes_read }) => (audio, bytes_read),
                Ok(Captured::Canceled(details)) => {
                    self.report_cancellation(&details);
                    return Err(details.into());
                }
                Err(e) => return Err(self.report_error(e)),
            };

            self.reporter
                .line(format!("Read [{bytes_read}] bytes from audio data stream."));
            summary.completed += 1;
            summary.bytes_read += bytes_read as u64;

            if self.options.save_audio {
                tokio::fs::write(path, &audio)
                    .await
                    .map_err(|source| SpeechCliError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
                self.reporter.line(format!("Audio saved to {}.", path.display()));
            }
        }

        info!(?summary, "Capture run finished");
        Ok(summary)
    }

    fn create_synthesizer(
        &self,
        settings: &SpeechSettings,
        output: AudioOutput,
    ) -> SpeechCliResult<BoxedSynthesizer> {
        let mut synthesizer = self
            .factory
            .create_synthesizer(settings, output)
            .map_err(|e| {
                error!("Failed to create synthesizer: {}", e);
                SpeechCliError::from(e)
            })?;

        synthesizer.set_event_handler(Arc::new(ConsoleEventLogger::new(self.reporter.clone())));
        debug!(provider = %synthesizer.get_provider_info(), "Synthesizer ready");
        Ok(synthesizer)
    }

    fn should_continue(&self, iterations: u64) -> bool {
        self.options.repeat == 0 || iterations < u64::from(self.options.repeat)
    }

    /// Races `future` against the outcome timeout.
    async fn with_timeout<T>(&self, future: impl Future<Output = T>) -> SpeechCliResult<T> {
        match tokio::time::timeout(self.options.timeout, future).await {
            Ok(value) => Ok(value),
            Err(_) => {
                self.reporter.line("Timed out");
                Err(SpeechCliError::Timeout(format!(
                    "no synthesis outcome within {} seconds",
                    self.options.timeout.as_secs()
                )))
            }
        }
    }

    fn report_cancellation(&self, details: &CancellationDetails) {
        self.reporter
            .line(format!("CANCELED: Reason={}.", details.reason.code()));
        if details.is_error() {
            self.reporter
                .line(format!("CANCELED: ErrorCode={}", details.error_code.code()));
            self.reporter
                .line(format!("CANCELED: ErrorDetails=[{}]", details.error_details));
            self.reporter
                .line("CANCELED: Did you update the subscription info?");
        }
    }

    fn report_error(&self, err: TTSError) -> SpeechCliError {
        self.reporter.line(format!("Got an error: {err}"));
        match err {
            TTSError::Canceled(details) => details.into(),
            other => SpeechCliError::Synthesis(other.to_string()),
        }
    }
}

/// Reads a started result through an audio data stream.
async fn drain(result: SynthesisResult) -> TTSResult<Captured> {
    if result.is_canceled() {
        return Ok(Captured::Canceled(cancellation_of(result)));
    }

    let mut stream = AudioDataStream::from_result(result)?;
    match stream.read_to_end().await {
        Ok(audio) => Ok(Captured::Audio {
            audio,
            bytes_read: stream.bytes_read(),
        }),
        Err(TTSError::Canceled(details)) => Ok(Captured::Canceled(details)),
        Err(e) => Err(e),
    }
}

fn cancellation_of(result: SynthesisResult) -> CancellationDetails {
    result.cancellation.unwrap_or_else(|| {
        CancellationDetails::error(
            CancellationErrorCode::RuntimeError,
            format!("result {} ended without audio", result.result_id),
        )
    })
}
