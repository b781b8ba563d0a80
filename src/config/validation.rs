use crate::core::tts::azure::{AzureAudioEncoding, SPEAKING_RATE_RANGE};
use crate::errors::{SpeechCliError, SpeechCliResult};

/// Validate the per-request timeout
///
/// A zero timeout would fail every request before it is sent.
pub fn validate_timeout(timeout_secs: u64) -> SpeechCliResult<()> {
    if timeout_secs == 0 {
        return Err(SpeechCliError::Configuration(
            "timeout must be at least one second".to_string(),
        ));
    }
    Ok(())
}

/// Validate the speaking rate multiplier
pub fn validate_speaking_rate(rate: Option<f32>) -> SpeechCliResult<()> {
    match rate {
        Some(rate) if !SPEAKING_RATE_RANGE.contains(&rate) => {
            Err(SpeechCliError::Configuration(format!(
                "speaking rate {rate} is outside {}..={}",
                SPEAKING_RATE_RANGE.start(),
                SPEAKING_RATE_RANGE.end()
            )))
        }
        _ => Ok(()),
    }
}

/// Validate that an explicit output format names a supported Azure format
pub fn validate_output_format(format: Option<&str>) -> SpeechCliResult<()> {
    let Some(format) = format else {
        return Ok(());
    };

    if AzureAudioEncoding::parse(format).is_none() {
        return Err(SpeechCliError::Configuration(format!(
            "unsupported output format '{format}'"
        )));
    }

    Ok(())
}
