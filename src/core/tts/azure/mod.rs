//! Microsoft Azure Text-to-Speech synthesizer.
//!
//! - **config**: output formats (`AzureAudioEncoding`), the validated
//!   `AzureSpeechConfig` and SSML generation.
//! - **synthesizer**: `AzureSynthesizer`, which talks to the REST API, and the
//!   `AzureSynthesizerFactory` building it from `SpeechSettings`.
//!
//! # Azure TTS API Reference
//!
//! - TTS endpoint: `https://{region}.tts.speech.microsoft.com/cognitiveservices/v1`
//! - Required headers: `Ocp-Apim-Subscription-Key`, `Content-Type: application/ssml+xml`,
//!   `X-Microsoft-OutputFormat`
//! - Documentation: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/rest-text-to-speech>

mod config;
mod synthesizer;

pub use config::{
    AZURE_OUTPUT_FORMAT_HEADER, AzureAudioEncoding, AzureSpeechConfig, DEFAULT_VOICE_NAME,
    SPEAKING_RATE_RANGE, build_ssml, escape_xml, language_code, validate_voice_name,
};
pub use synthesizer::{AzureSynthesizer, AzureSynthesizerFactory};
