//! Configuration types for the Azure Text-to-Speech REST API.
//!
//! This module contains:
//! - Audio output format specifications
//! - The validated synthesizer configuration (`AzureSpeechConfig`)
//! - SSML generation utilities

use std::path::Path;

use tracing::debug;

use crate::core::providers::azure::{SpeechEndpoint, mask_subscription_key};
use crate::core::tts::base::{SpeechSettings, TTSError, TTSResult};

/// HTTP header name for Azure TTS output format.
pub const AZURE_OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

/// Voice used when none is configured.
pub const DEFAULT_VOICE_NAME: &str = "zh-CN-XiaomoNeural";

/// Accepted speaking rate multipliers.
pub const SPEAKING_RATE_RANGE: std::ops::RangeInclusive<f32> = 0.5..=2.0;

// =============================================================================
// Audio Encoding
// =============================================================================

/// Azure Text-to-Speech audio output format options.
///
/// These map to `X-Microsoft-OutputFormat` header values:
///
/// - **Raw**: headerless PCM, mu-law or a-law, suitable for direct playback
/// - **RIFF**: PCM with a WAV header, suitable for `.wav` files
/// - **MP3** and **Opus**: compressed formats for storage
///
/// ```rust
/// use azure_speech_cli::core::tts::azure::AzureAudioEncoding;
///
/// let format = AzureAudioEncoding::Riff24Khz16BitMonoPcm;
/// assert_eq!(format.as_str(), "riff-24khz-16bit-mono-pcm");
/// assert_eq!(format.sample_rate(), 24000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AzureAudioEncoding {
    Raw8Khz8BitMonoMulaw,
    Raw8Khz8BitMonoAlaw,
    Raw8Khz16BitMonoPcm,
    Raw16Khz16BitMonoPcm,
    Raw22050Hz16BitMonoPcm,
    Raw24Khz16BitMonoPcm,
    Raw44100Hz16BitMonoPcm,
    Raw48Khz16BitMonoPcm,
    Riff8Khz16BitMonoPcm,
    Riff16Khz16BitMonoPcm,
    Riff22050Hz16BitMonoPcm,
    #[default]
    Riff24Khz16BitMonoPcm,
    Riff44100Hz16BitMonoPcm,
    Riff48Khz16BitMonoPcm,
    Audio16Khz32KbitrateMonoMp3,
    Audio16Khz64KbitrateMonoMp3,
    Audio24Khz48KbitrateMonoMp3,
    Audio24Khz96KbitrateMonoMp3,
    Audio48Khz96KbitrateMonoMp3,
    Audio48Khz192KbitrateMonoMp3,
    Ogg16Khz16BitMonoOpus,
    Ogg24Khz16BitMonoOpus,
    Ogg48Khz16BitMonoOpus,
    Audio16Khz16Bit32KbpsMonoOpus,
    Audio24Khz16Bit24KbpsMonoOpus,
    Audio24Khz16Bit48KbpsMonoOpus,
}

impl AzureAudioEncoding {
    /// Every supported format.
    pub const ALL: [Self; 26] = [
        Self::Raw8Khz8BitMonoMulaw,
        Self::Raw8Khz8BitMonoAlaw,
        Self::Raw8Khz16BitMonoPcm,
        Self::Raw16Khz16BitMonoPcm,
        Self::Raw22050Hz16BitMonoPcm,
        Self::Raw24Khz16BitMonoPcm,
        Self::Raw44100Hz16BitMonoPcm,
        Self::Raw48Khz16BitMonoPcm,
        Self::Riff8Khz16BitMonoPcm,
        Self::Riff16Khz16BitMonoPcm,
        Self::Riff22050Hz16BitMonoPcm,
        Self::Riff24Khz16BitMonoPcm,
        Self::Riff44100Hz16BitMonoPcm,
        Self::Riff48Khz16BitMonoPcm,
        Self::Audio16Khz32KbitrateMonoMp3,
        Self::Audio16Khz64KbitrateMonoMp3,
        Self::Audio24Khz48KbitrateMonoMp3,
        Self::Audio24Khz96KbitrateMonoMp3,
        Self::Audio48Khz96KbitrateMonoMp3,
        Self::Audio48Khz192KbitrateMonoMp3,
        Self::Ogg16Khz16BitMonoOpus,
        Self::Ogg24Khz16BitMonoOpus,
        Self::Ogg48Khz16BitMonoOpus,
        Self::Audio16Khz16Bit32KbpsMonoOpus,
        Self::Audio24Khz16Bit24KbpsMonoOpus,
        Self::Audio24Khz16Bit48KbpsMonoOpus,
    ];

    /// Format used for speaker playback.
    pub const SPEAKER: Self = Self::Raw24Khz16BitMonoPcm;

    /// Returns the Azure API format string for the `X-Microsoft-OutputFormat` header.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw8Khz8BitMonoMulaw => "raw-8khz-8bit-mono-mulaw",
            Self::Raw8Khz8BitMonoAlaw => "raw-8khz-8bit-mono-alaw",
            Self::Raw8Khz16BitMonoPcm => "raw-8khz-16bit-mono-pcm",
            Self::Raw16Khz16BitMonoPcm => "raw-16khz-16bit-mono-pcm",
            Self::Raw22050Hz16BitMonoPcm => "raw-22050hz-16bit-mono-pcm",
            Self::Raw24Khz16BitMonoPcm => "raw-24khz-16bit-mono-pcm",
            Self::Raw44100Hz16BitMonoPcm => "raw-44100hz-16bit-mono-pcm",
            Self::Raw48Khz16BitMonoPcm => "raw-48khz-16bit-mono-pcm",
            Self::Riff8Khz16BitMonoPcm => "riff-8khz-16bit-mono-pcm",
            Self::Riff16Khz16BitMonoPcm => "riff-16khz-16bit-mono-pcm",
            Self::Riff22050Hz16BitMonoPcm => "riff-22050hz-16bit-mono-pcm",
            Self::Riff24Khz16BitMonoPcm => "riff-24khz-16bit-mono-pcm",
            Self::Riff44100Hz16BitMonoPcm => "riff-44100hz-16bit-mono-pcm",
            Self::Riff48Khz16BitMonoPcm => "riff-48khz-16bit-mono-pcm",
            Self::Audio16Khz32KbitrateMonoMp3 => "audio-16khz-32kbitrate-mono-mp3",
            Self::Audio16Khz64KbitrateMonoMp3 => "audio-16khz-64kbitrate-mono-mp3",
            Self::Audio24Khz48KbitrateMonoMp3 => "audio-24khz-48kbitrate-mono-mp3",
            Self::Audio24Khz96KbitrateMonoMp3 => "audio-24khz-96kbitrate-mono-mp3",
            Self::Audio48Khz96KbitrateMonoMp3 => "audio-48khz-96kbitrate-mono-mp3",
            Self::Audio48Khz192KbitrateMonoMp3 => "audio-48khz-192kbitrate-mono-mp3",
            Self::Ogg16Khz16BitMonoOpus => "ogg-16khz-16bit-mono-opus",
            Self::Ogg24Khz16BitMonoOpus => "ogg-24khz-16bit-mono-opus",
            Self::Ogg48Khz16BitMonoOpus => "ogg-48khz-16bit-mono-opus",
            Self::Audio16Khz16Bit32KbpsMonoOpus => "audio-16khz-16bit-32kbps-mono-opus",
            Self::Audio24Khz16Bit24KbpsMonoOpus => "audio-24khz-16bit-24kbps-mono-opus",
            Self::Audio24Khz16Bit48KbpsMonoOpus => "audio-24khz-16bit-48kbps-mono-opus",
        }
    }

    /// Returns the sample rate in Hz for this audio format.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Raw8Khz8BitMonoMulaw
            | Self::Raw8Khz8BitMonoAlaw
            | Self::Raw8Khz16BitMonoPcm
            | Self::Riff8Khz16BitMonoPcm => 8000,

            Self::Raw16Khz16BitMonoPcm
            | Self::Riff16Khz16BitMonoPcm
            | Self::Audio16Khz32KbitrateMonoMp3
            | Self::Audio16Khz64KbitrateMonoMp3
            | Self::Ogg16Khz16BitMonoOpus
            | Self::Audio16Khz16Bit32KbpsMonoOpus => 16000,

            Self::Raw22050Hz16BitMonoPcm | Self::Riff22050Hz16BitMonoPcm => 22050,

            Self::Raw24Khz16BitMonoPcm
            | Self::Riff24Khz16BitMonoPcm
            | Self::Audio24Khz48KbitrateMonoMp3
            | Self::Audio24Khz96KbitrateMonoMp3
            | Self::Ogg24Khz16BitMonoOpus
            | Self::Audio24Khz16Bit24KbpsMonoOpus
            | Self::Audio24Khz16Bit48KbpsMonoOpus => 24000,

            Self::Raw44100Hz16BitMonoPcm | Self::Riff44100Hz16BitMonoPcm => 44100,

            Self::Raw48Khz16BitMonoPcm
            | Self::Riff48Khz16BitMonoPcm
            | Self::Audio48Khz96KbitrateMonoMp3
            | Self::Audio48Khz192KbitrateMonoMp3
            | Self::Ogg48Khz16BitMonoOpus => 48000,
        }
    }

    /// Returns true for headerless 16-bit PCM, the only format the speaker plays.
    #[inline]
    pub fn is_raw_pcm(&self) -> bool {
        matches!(
            self,
            Self::Raw8Khz16BitMonoPcm
                | Self::Raw16Khz16BitMonoPcm
                | Self::Raw22050Hz16BitMonoPcm
                | Self::Raw24Khz16BitMonoPcm
                | Self::Raw44100Hz16BitMonoPcm
                | Self::Raw48Khz16BitMonoPcm
        )
    }

    /// Parses a format name.
    ///
    /// Accepts the exact Azure names as well as the short aliases `wav`, `riff`,
    /// `pcm`, `linear16`, `mp3`, `ogg`, `opus`, `mulaw`, `ulaw` and `alaw`.
    ///
    /// ```rust
    /// use azure_speech_cli::core::tts::azure::AzureAudioEncoding;
    ///
    /// assert_eq!(
    ///     AzureAudioEncoding::parse("audio-24khz-96kbitrate-mono-mp3"),
    ///     Some(AzureAudioEncoding::Audio24Khz96KbitrateMonoMp3)
    /// );
    /// assert_eq!(
    ///     AzureAudioEncoding::parse("MP3"),
    ///     Some(AzureAudioEncoding::Audio24Khz96KbitrateMonoMp3)
    /// );
    /// assert_eq!(AzureAudioEncoding::parse("flac"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(format) = Self::ALL.iter().find(|f| f.as_str() == name) {
            return Some(*format);
        }

        match name.as_str() {
            "wav" | "riff" => Some(Self::Riff24Khz16BitMonoPcm),
            "pcm" | "linear16" | "raw" => Some(Self::Raw24Khz16BitMonoPcm),
            "mp3" => Some(Self::Audio24Khz96KbitrateMonoMp3),
            "ogg" => Some(Self::Ogg24Khz16BitMonoOpus),
            "opus" => Some(Self::Audio24Khz16Bit48KbpsMonoOpus),
            "mulaw" | "ulaw" => Some(Self::Raw8Khz8BitMonoMulaw),
            "alaw" => Some(Self::Raw8Khz8BitMonoAlaw),
            _ => None,
        }
    }

    /// Infers the format from an output file extension.
    ///
    /// Unknown or missing extensions fall back to 24 kHz WAV.
    pub fn from_output_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("mp3") => Self::Audio24Khz96KbitrateMonoMp3,
            Some("ogg") | Some("opus") => Self::Ogg24Khz16BitMonoOpus,
            Some("pcm") | Some("raw") => Self::Raw24Khz16BitMonoPcm,
            _ => Self::Riff24Khz16BitMonoPcm,
        }
    }
}

// =============================================================================
// SSML Generation
// =============================================================================

/// Escapes special XML characters in text for use in SSML.
///
/// ```rust
/// use azure_speech_cli::core::tts::azure::escape_xml;
///
/// assert_eq!(escape_xml("Hello & goodbye"), "Hello &amp; goodbye");
/// ```
pub fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Builds an SSML document for Azure TTS.
///
/// Adds a prosody element when a speaking rate other than 1.0 is given.
///
/// ```rust
/// use azure_speech_cli::core::tts::azure::build_ssml;
///
/// let ssml = build_ssml("Hello world!", "en-US-JennyNeural", "en-US", Some(1.5));
/// assert!(ssml.contains("<voice name='en-US-JennyNeural'>"));
/// assert!(ssml.contains("rate=\"150%\""));
/// ```
pub fn build_ssml(
    text: &str,
    voice_name: &str,
    language: &str,
    speaking_rate: Option<f32>,
) -> String {
    let escaped_text = escape_xml(text);

    let inner_content = match speaking_rate {
        Some(rate) if (rate - 1.0).abs() > 0.01 => {
            let rate_percent = (rate * 100.0).round() as i32;
            format!("<prosody rate=\"{rate_percent}%\">{escaped_text}</prosody>")
        }
        _ => escaped_text,
    };

    format!(
        r#"<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{language}'>
    <voice name='{voice_name}'>
        {inner_content}
    </voice>
</speak>"#,
    )
}

/// Extracts the BCP-47 language code from a voice name.
///
/// Voice names follow `{lang}-{REGION}-{name}`, e.g. "zh-CN-XiaomoNeural".
/// Falls back to "en-US".
pub fn language_code(voice_name: &str) -> String {
    const DEFAULT_LANGUAGE: &str = "en-US";

    let mut parts = voice_name.split('-');
    if let (Some(language), Some(region)) = (parts.next(), parts.next())
        && !language.is_empty()
        && region.len() == 2
        && region.chars().all(|c| c.is_ascii_uppercase())
    {
        return format!("{language}-{region}");
    }

    DEFAULT_LANGUAGE.to_string()
}

/// Validates a voice name of the form `{lang}-{REGION}-{name}`.
///
/// The name segment may carry a `:` qualifier, as HD voices such as
/// "en-US-Ava:DragonHDLatestNeural" do.
pub fn validate_voice_name(voice_name: &str) -> TTSResult<()> {
    let is_word_char = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let parts: Vec<&str> = voice_name.split('-').collect();

    let valid = match parts.split_last() {
        Some((name, prefix)) if prefix.len() >= 2 => {
            prefix
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(is_word_char))
                && name
                    .split(':')
                    .all(|p| !p.is_empty() && p.chars().all(is_word_char))
        }
        _ => false,
    };

    if !valid {
        return Err(TTSError::InvalidConfiguration(format!(
            "invalid voice name '{voice_name}', expected a name like '{DEFAULT_VOICE_NAME}'"
        )));
    }

    Ok(())
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Validated configuration of the Azure synthesizer.
///
/// Created once from [`SpeechSettings`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct AzureSpeechConfig {
    pub endpoint: SpeechEndpoint,
    pub subscription_key: String,
    pub voice_name: String,
    pub output_format: AzureAudioEncoding,
    pub speaking_rate: Option<f32>,
}

impl AzureSpeechConfig {
    /// Builds a configuration from [`SpeechSettings`].
    ///
    /// `default_format` applies when the settings name no output format.
    ///
    /// ```rust
    /// use azure_speech_cli::core::tts::azure::{AzureAudioEncoding, AzureSpeechConfig};
    /// use azure_speech_cli::core::tts::SpeechSettings;
    ///
    /// let settings = SpeechSettings {
    ///     region: Some("eastasia".into()),
    ///     subscription_key: "key".into(),
    ///     ..Default::default()
    /// };
    /// let config =
    ///     AzureSpeechConfig::from_settings(&settings, AzureAudioEncoding::default()).unwrap();
    /// assert_eq!(config.voice_name, "zh-CN-XiaomoNeural");
    ///
    /// let no_key = SpeechSettings { subscription_key: String::new(), ..settings };
    /// assert!(AzureSpeechConfig::from_settings(&no_key, AzureAudioEncoding::default()).is_err());
    /// ```
    pub fn from_settings(
        settings: &SpeechSettings,
        default_format: AzureAudioEncoding,
    ) -> TTSResult<Self> {
        let endpoint =
            SpeechEndpoint::resolve(settings.endpoint.as_deref(), settings.region.as_deref())
                .map_err(|e| TTSError::InvalidConfiguration(e.to_string()))?;

        let mut config = Self::new(endpoint, &settings.subscription_key)?;

        if let Some(voice_name) = settings.voice_name.as_deref()
            && !voice_name.trim().is_empty()
        {
            config.set_voice_name(voice_name.trim())?;
        }

        config.output_format = match settings.output_format.as_deref() {
            Some(name) if !name.trim().is_empty() => {
                AzureAudioEncoding::parse(name).ok_or_else(|| {
                    TTSError::InvalidConfiguration(format!("unsupported output format '{name}'"))
                })?
            }
            _ => default_format,
        };

        if let Some(rate) = settings.speaking_rate {
            config.set_speaking_rate(rate)?;
        }

        debug!(
            endpoint = config.endpoint.as_str(),
            subscription_key = %mask_subscription_key(&config.subscription_key),
            voice = %config.voice_name,
            format = config.output_format.as_str(),
            "Azure speech configuration created"
        );

        Ok(config)
    }

    fn new(endpoint: SpeechEndpoint, subscription_key: &str) -> TTSResult<Self> {
        let subscription_key = subscription_key.trim();
        if subscription_key.is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "subscription key can not be empty".to_string(),
            ));
        }
        if subscription_key.chars().any(|c| c.is_control()) {
            return Err(TTSError::InvalidConfiguration(
                "subscription key contains control characters".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            subscription_key: subscription_key.to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            output_format: AzureAudioEncoding::default(),
            speaking_rate: None,
        })
    }

    /// Selects the synthesis voice.
    pub fn set_voice_name(&mut self, voice_name: &str) -> TTSResult<()> {
        validate_voice_name(voice_name)?;
        self.voice_name = voice_name.to_string();
        Ok(())
    }

    /// Sets the speaking rate multiplier.
    pub fn set_speaking_rate(&mut self, rate: f32) -> TTSResult<()> {
        if !SPEAKING_RATE_RANGE.contains(&rate) {
            return Err(TTSError::InvalidConfiguration(format!(
                "speaking rate {rate} is outside {}..={}",
                SPEAKING_RATE_RANGE.start(),
                SPEAKING_RATE_RANGE.end()
            )));
        }
        self.speaking_rate = Some(rate);
        Ok(())
    }

    /// Language derived from the voice name.
    pub fn language_code(&self) -> String {
        language_code(&self.voice_name)
    }

    /// Builds the SSML document for a given text input.
    pub fn build_ssml_for_text(&self, text: &str) -> String {
        build_ssml(
            text,
            &self.voice_name,
            &self.language_code(),
            self.speaking_rate,
        )
    }
}
