use std::path::PathBuf;

use crate::core::tts::{CancellationDetails, CancellationErrorCode, CancellationReason, TTSError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum SpeechCliError {
    /// Input rejected before any synthesis was attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Endpoint, key, voice or other settings were rejected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No synthesis outcome arrived in time
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The synthesizer itself failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// The service canceled the request
    #[error(
        "Synthesis canceled: reason={}, error_code={}, details=[{error_details}]",
        reason.code(),
        error_code.code()
    )]
    Cancellation {
        reason: CancellationReason,
        error_code: CancellationErrorCode,
        error_details: String,
    },

    /// Writing the output file failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<CancellationDetails> for SpeechCliError {
    fn from(details: CancellationDetails) -> Self {
        SpeechCliError::Cancellation {
            reason: details.reason,
            error_code: details.error_code,
            error_details: details.error_details,
        }
    }
}

impl From<TTSError> for SpeechCliError {
    fn from(err: TTSError) -> Self {
        match err {
            TTSError::InvalidConfiguration(msg) => SpeechCliError::Configuration(msg),
            TTSError::Canceled(details) => details.into(),
            TTSError::TimeoutError(msg) => SpeechCliError::Timeout(msg),
            other => SpeechCliError::Synthesis(other.to_string()),
        }
    }
}

// Result type alias for convenience
pub type SpeechCliResult<T> = Result<T, SpeechCliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tts_error() {
        assert!(matches!(
            SpeechCliError::from(TTSError::InvalidConfiguration("bad voice".into())),
            SpeechCliError::Configuration(msg) if msg == "bad voice"
        ));
        assert!(matches!(
            SpeechCliError::from(TTSError::TimeoutError("slow".into())),
            SpeechCliError::Timeout(_)
        ));
        assert!(matches!(
            SpeechCliError::from(TTSError::NetworkError("reset".into())),
            SpeechCliError::Synthesis(msg) if msg == "Network error: reset"
        ));
    }

    #[test]
    fn test_from_canceled() {
        let err = SpeechCliError::from(TTSError::Canceled(CancellationDetails::error(
            CancellationErrorCode::AuthenticationFailure,
            "401 Unauthorized: ",
        )));

        match &err {
            SpeechCliError::Cancellation {
                reason,
                error_code,
                error_details,
            } => {
                assert_eq!(*reason, CancellationReason::Error);
                assert_eq!(*error_code, CancellationErrorCode::AuthenticationFailure);
                assert_eq!(error_details, "401 Unauthorized: ");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Synthesis canceled: reason=1, error_code=1, details=[401 Unauthorized: ]"
        );
    }
}
