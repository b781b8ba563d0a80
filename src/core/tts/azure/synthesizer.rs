//! Azure speech synthesizer over the Text-to-Speech REST API.
//!
//! Each synthesis is a single HTTP POST:
//! - URL: the resolved speech endpoint, e.g.
//!   `https://{region}.tts.speech.microsoft.com/cognitiveservices/v1`
//! - Authentication: `Ocp-Apim-Subscription-Key` header
//! - Content-Type: `application/ssml+xml`
//! - Output format: `X-Microsoft-OutputFormat` header
//!
//! The response body is streamed. Every received chunk raises a `synthesizing`
//! notification. Service and transport failures become canceled results with an
//! error code derived from the HTTP status.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::{AZURE_OUTPUT_FORMAT_HEADER, AzureAudioEncoding, AzureSpeechConfig};
use crate::core::audio::{AudioOutput, AudioSink, default_speaker};
use crate::core::providers::azure::AZURE_SUBSCRIPTION_KEY_HEADER;
use crate::core::tts::base::{
    AudioData, BoxedSynthesizer, CancellationDetails, CancellationErrorCode, SpeechSettings,
    SpeechSynthesizer, SynthesisEventArgs, SynthesisEventHandler, SynthesisOutcome,
    SynthesisResult, SynthesizerFactory, TTSError, TTSResult, new_result_id,
};

/// User-Agent header value for Azure TTS requests.
const USER_AGENT: &str = concat!("azure-speech-cli/", env!("CARGO_PKG_VERSION"));

/// Capacity of the channel feeding an audio data stream.
const AUDIO_CHANNEL_CAPACITY: usize = 32;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Events
// =============================================================================

/// Raises lifecycle notifications for one result.
#[derive(Clone)]
struct EventEmitter {
    handler: Option<Arc<dyn SynthesisEventHandler>>,
    result_id: String,
}

impl EventEmitter {
    fn args(&self) -> SynthesisEventArgs {
        SynthesisEventArgs {
            result_id: self.result_id.clone(),
            ..Default::default()
        }
    }

    async fn started(&self) {
        if let Some(handler) = &self.handler {
            handler.on_synthesis_started(self.args()).await;
        }
    }

    async fn synthesizing(&self, audio_chunk_len: usize) {
        if let Some(handler) = &self.handler {
            handler
                .on_synthesizing(SynthesisEventArgs {
                    audio_chunk_len,
                    ..self.args()
                })
                .await;
        }
    }

    async fn completed(&self, audio_len: usize) {
        if let Some(handler) = &self.handler {
            handler
                .on_synthesis_completed(SynthesisEventArgs {
                    audio_len,
                    ..self.args()
                })
                .await;
        }
    }

    async fn canceled(&self, details: &CancellationDetails) {
        if let Some(handler) = &self.handler {
            handler
                .on_synthesis_canceled(SynthesisEventArgs {
                    cancellation: Some(details.clone()),
                    ..self.args()
                })
                .await;
        }
    }
}

// =============================================================================
// AzureSynthesizer
// =============================================================================

/// Microsoft Azure speech synthesizer.
///
/// Created with a sink, [`play`](SpeechSynthesizer::play) sends completed audio to
/// it. Without one the audio stays in the result.
pub struct AzureSynthesizer {
    client: reqwest::Client,
    config: AzureSpeechConfig,
    sink: Option<Arc<dyn AudioSink>>,
    handler: Option<Arc<dyn SynthesisEventHandler>>,
}

impl AzureSynthesizer {
    /// Creates a synthesizer.
    ///
    /// A sink only accepts headerless PCM, so other output formats are rejected
    /// when one is given.
    pub fn new(config: AzureSpeechConfig, sink: Option<Arc<dyn AudioSink>>) -> TTSResult<Self> {
        if sink.is_some() && !config.output_format.is_raw_pcm() {
            return Err(TTSError::InvalidConfiguration(format!(
                "output format {} can not be played on a speaker",
                config.output_format.as_str()
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| TTSError::InternalError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            sink,
            handler: None,
        })
    }

    /// Builds the synthesis request with headers and SSML body.
    pub fn build_http_request(&self, text: &str) -> reqwest::RequestBuilder {
        let ssml_body = self.config.build_ssml_for_text(text);

        self.client
            .post(self.config.endpoint.as_str())
            .header(AZURE_SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .header("Content-Type", "application/ssml+xml")
            .header(AZURE_OUTPUT_FORMAT_HEADER, self.config.output_format.as_str())
            .header("User-Agent", USER_AGENT)
            .body(ssml_body)
    }

    fn emitter(&self) -> EventEmitter {
        EventEmitter {
            handler: self.handler.clone(),
            result_id: new_result_id(),
        }
    }

    /// Sends the request and checks the response status.
    async fn open(&self, text: &str) -> Result<reqwest::Response, CancellationDetails> {
        let response = self.build_http_request(text).send().await.map_err(|e| {
            error!("Azure TTS request failed: {}", e);
            let code = if e.is_timeout() {
                CancellationErrorCode::ServiceTimeout
            } else {
                CancellationErrorCode::ConnectionFailure
            };
            CancellationDetails::error(code, format!("connection failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Azure TTS API error ({}): {}", status, error_body);

            return Err(CancellationDetails::error(
                CancellationErrorCode::from_http_status(status.as_u16()),
                format!("{status}: {error_body}"),
            ));
        }

        Ok(response)
    }

    async fn cancel(
        &self,
        events: &EventEmitter,
        details: CancellationDetails,
    ) -> SynthesisOutcome {
        events.canceled(&details).await;
        Ok(SynthesisResult::canceled(details).with_result_id(events.result_id.clone()))
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn synthesize_text(&self, text: &str) -> SynthesisOutcome {
        let events = self.emitter();
        info!(
            result_id = %events.result_id,
            voice = %self.config.voice_name,
            "Synthesizing {} characters",
            text.chars().count()
        );

        let response = match self.open(text).await {
            Ok(response) => response,
            Err(details) => return self.cancel(&events, details).await,
        };

        events.started().await;

        let mut audio = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    events.synthesizing(chunk.len()).await;
                    audio.extend_from_slice(&chunk);
                }
                Err(e) => {
                    error!("Failed to read audio chunk: {}", e);
                    let details = CancellationDetails::error(
                        CancellationErrorCode::ConnectionFailure,
                        format!("failed to read audio: {e}"),
                    );
                    return self.cancel(&events, details).await;
                }
            }
        }

        events.completed(audio.len()).await;
        debug!(result_id = %events.result_id, bytes = audio.len(), "Synthesis completed");

        Ok(SynthesisResult::completed(audio).with_result_id(events.result_id))
    }

    async fn play(&self, result: &SynthesisResult) -> TTSResult<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };

        let sample_rate = self.config.output_format.sample_rate();
        debug!(result_id = %result.result_id, bytes = result.audio_data.len(), "Playing audio");
        sink.play(AudioData::pcm16(result.audio_data.clone(), sample_rate)).await
    }

    async fn start_speaking_text(&self, text: &str) -> SynthesisOutcome {
        let events = self.emitter();
        info!(
            result_id = %events.result_id,
            voice = %self.config.voice_name,
            "Starting synthesis of {} characters",
            text.chars().count()
        );

        let response = match self.open(text).await {
            Ok(response) => response,
            Err(details) => return self.cancel(&events, details).await,
        };

        events.started().await;

        let (sender, receiver) = mpsc::channel(AUDIO_CHANNEL_CAPACITY);
        let result_id = events.result_id.clone();
        tokio::spawn(pump_audio(response, sender, events));

        Ok(SynthesisResult::started(receiver).with_result_id(result_id))
    }

    fn set_event_handler(&mut self, handler: Arc<dyn SynthesisEventHandler>) {
        self.handler = Some(handler);
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "azure",
            "version": env!("CARGO_PKG_VERSION"),
            "api_type": "HTTP REST",
            "endpoint": self.config.endpoint.as_str(),
            "region": self.config.endpoint.region().map(|r| r.as_str().to_string()),
            "voice": self.config.voice_name,
            "output_format": self.config.output_format.as_str(),
            "sample_rate": self.config.output_format.sample_rate(),
        })
    }
}

/// Forwards the response body into an audio data stream channel.
async fn pump_audio(
    response: reqwest::Response,
    sender: mpsc::Sender<TTSResult<Bytes>>,
    events: EventEmitter,
) {
    let mut audio_len = 0usize;
    let mut stream = response.bytes_stream();

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                audio_len += chunk.len();
                events.synthesizing(chunk.len()).await;
                if sender.send(Ok(chunk)).await.is_err() {
                    warn!(result_id = %events.result_id, "Audio stream reader went away");
                    return;
                }
            }
            Err(e) => {
                error!("Failed to read audio chunk: {}", e);
                let details = CancellationDetails::error(
                    CancellationErrorCode::ConnectionFailure,
                    format!("failed to read audio: {e}"),
                );
                events.canceled(&details).await;
                let _ = sender.send(Err(TTSError::Canceled(details))).await;
                return;
            }
        }
    }

    events.completed(audio_len).await;
    debug!(result_id = %events.result_id, bytes = audio_len, "Audio stream finished");
}

// =============================================================================
// Factory
// =============================================================================

/// Builds [`AzureSynthesizer`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureSynthesizerFactory;

impl SynthesizerFactory for AzureSynthesizerFactory {
    fn create_synthesizer(
        &self,
        settings: &SpeechSettings,
        output: AudioOutput,
    ) -> TTSResult<BoxedSynthesizer> {
        let synthesizer = match output {
            AudioOutput::DefaultSpeaker => {
                let config =
                    AzureSpeechConfig::from_settings(settings, AzureAudioEncoding::SPEAKER)?;
                AzureSynthesizer::new(config, Some(default_speaker()?))?
            }
            AudioOutput::Stream => {
                let config =
                    AzureSpeechConfig::from_settings(settings, AzureAudioEncoding::default())?;
                AzureSynthesizer::new(config, None)?
            }
        };

        Ok(Box::new(synthesizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AzureSpeechConfig {
        AzureSpeechConfig::from_settings(
            &SpeechSettings {
                region: Some("westeurope".into()),
                subscription_key: "test-subscription-key".into(),
                voice_name: Some("en-US-JennyNeural".into()),
                ..Default::default()
            },
            AzureAudioEncoding::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_http_request_headers() {
        let synthesizer = AzureSynthesizer::new(config(), None).unwrap();
        let request = synthesizer
            .build_http_request("Hello <world>")
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );

        let headers = request.headers();
        assert_eq!(
            headers.get(AZURE_SUBSCRIPTION_KEY_HEADER).unwrap(),
            "test-subscription-key"
        );
        assert_eq!(headers.get("Content-Type").unwrap(), "application/ssml+xml");
        assert_eq!(
            headers.get(AZURE_OUTPUT_FORMAT_HEADER).unwrap(),
            "riff-24khz-16bit-mono-pcm"
        );
        assert!(
            headers
                .get("User-Agent")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("azure-speech-cli/")
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert!(body.contains("<voice name='en-US-JennyNeural'>"));
        assert!(body.contains("Hello &lt;world&gt;"));
    }

    #[test]
    fn test_sink_requires_raw_pcm() {
        struct NullSink;

        #[async_trait]
        impl AudioSink for NullSink {
            async fn play(&self, _audio: AudioData) -> TTSResult<()> {
                Ok(())
            }
        }

        let result = AzureSynthesizer::new(config(), Some(Arc::new(NullSink)));
        assert!(matches!(result, Err(TTSError::InvalidConfiguration(_))));

        let mut raw = config();
        raw.output_format = AzureAudioEncoding::SPEAKER;
        assert!(AzureSynthesizer::new(raw, Some(Arc::new(NullSink))).is_ok());
    }

    #[test]
    fn test_provider_info() {
        let synthesizer = AzureSynthesizer::new(config(), None).unwrap();
        let info = synthesizer.get_provider_info();

        assert_eq!(info["provider"], "azure");
        assert_eq!(info["region"], "westeurope");
        assert_eq!(info["voice"], "en-US-JennyNeural");
        assert_eq!(info["sample_rate"], 24000);
    }

    #[test]
    fn test_factory_rejects_invalid_settings() {
        let settings = SpeechSettings {
            endpoint: Some("not a url".into()),
            subscription_key: "key".into(),
            ..Default::default()
        };

        let result = AzureSynthesizerFactory.create_synthesizer(&settings, AudioOutput::Stream);
        assert!(matches!(result, Err(TTSError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_factory_stream_output() {
        let settings = SpeechSettings {
            region: Some("eastasia".into()),
            subscription_key: "key".into(),
            ..Default::default()
        };

        let synthesizer = AzureSynthesizerFactory
            .create_synthesizer(&settings, AudioOutput::Stream)
            .unwrap();
        let info = synthesizer.get_provider_info();
        assert_eq!(info["voice"], "zh-CN-XiaomoNeural");
        assert_eq!(info["output_format"], "riff-24khz-16bit-mono-pcm");
    }
}
