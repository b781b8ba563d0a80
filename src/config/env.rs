use std::env;
use std::path::PathBuf;

use super::utils::{non_empty, parse_bool};
use crate::errors::{SpeechCliError, SpeechCliResult};

pub const ENV_ENDPOINT: &str = "AZURE_SPEECH_ENDPOINT";
pub const ENV_SUBSCRIPTION_KEY: &str = "AZURE_SPEECH_SUBSCRIPTION_KEY";
pub const ENV_REGION: &str = "AZURE_SPEECH_REGION";
pub const ENV_VOICE: &str = "AZURE_SPEECH_VOICE";
pub const ENV_OUTPUT_FORMAT: &str = "AZURE_SPEECH_OUTPUT_FORMAT";
pub const ENV_RATE: &str = "AZURE_SPEECH_RATE";
pub const ENV_TIMEOUT_SECS: &str = "AZURE_SPEECH_TIMEOUT_SECS";
pub const ENV_SAVE_AUDIO: &str = "AZURE_SPEECH_SAVE_AUDIO";
pub const ENV_CONFIG: &str = "AZURE_SPEECH_CONFIG";

/// Settings read from `AZURE_SPEECH_*` environment variables.
///
/// Unset and empty variables are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub endpoint: Option<String>,
    pub subscription_key: Option<String>,
    pub region: Option<String>,
    pub voice: Option<String>,
    pub output_format: Option<String>,
    pub speaking_rate: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub save_audio: Option<bool>,
    pub config_path: Option<PathBuf>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded by the binary before this runs.
    ///
    /// # Errors
    /// Returns a configuration error if a numeric or boolean variable is malformed.
    pub fn from_env() -> SpeechCliResult<Self> {
        let var = |name: &str| non_empty(env::var(name).ok());

        let speaking_rate = var(ENV_RATE)
            .map(|v| {
                v.trim().parse::<f32>().map_err(|e| {
                    SpeechCliError::Configuration(format!("Invalid {ENV_RATE} value '{v}': {e}"))
                })
            })
            .transpose()?;

        let timeout_secs = var(ENV_TIMEOUT_SECS)
            .map(|v| {
                v.trim().parse::<u64>().map_err(|e| {
                    SpeechCliError::Configuration(format!(
                        "Invalid {ENV_TIMEOUT_SECS} value '{v}': {e}"
                    ))
                })
            })
            .transpose()?;

        let save_audio = var(ENV_SAVE_AUDIO)
            .map(|v| {
                parse_bool(&v).ok_or_else(|| {
                    SpeechCliError::Configuration(format!(
                        "Invalid {ENV_SAVE_AUDIO} value '{v}', expected true or false"
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            endpoint: var(ENV_ENDPOINT),
            subscription_key: var(ENV_SUBSCRIPTION_KEY),
            region: var(ENV_REGION),
            voice: var(ENV_VOICE),
            output_format: var(ENV_OUTPUT_FORMAT),
            speaking_rate,
            timeout_secs,
            save_audio,
            config_path: var(ENV_CONFIG).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 9] = [
        ENV_ENDPOINT,
        ENV_SUBSCRIPTION_KEY,
        ENV_REGION,
        ENV_VOICE,
        ENV_OUTPUT_FORMAT,
        ENV_RATE,
        ENV_TIMEOUT_SECS,
        ENV_SAVE_AUDIO,
        ENV_CONFIG,
    ];

    fn cleanup_env_vars() {
        unsafe {
            for name in ALL_VARS {
                env::remove_var(name);
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_empty() {
        cleanup_env_vars();

        let config = EnvConfig::from_env().unwrap();
        assert_eq!(config, EnvConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_values() {
        cleanup_env_vars();

        unsafe {
            env::set_var(ENV_ENDPOINT, "https://eastasia.api.cognitive.microsoft.com/");
            env::set_var(ENV_SUBSCRIPTION_KEY, "env-key");
            env::set_var(ENV_VOICE, "");
            env::set_var(ENV_RATE, "1.5");
            env::set_var(ENV_TIMEOUT_SECS, " 15 ");
            env::set_var(ENV_SAVE_AUDIO, "no");
            env::set_var(ENV_CONFIG, "/etc/azure-speech.yaml");
        }

        let config = EnvConfig::from_env().unwrap();

        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://eastasia.api.cognitive.microsoft.com/")
        );
        assert_eq!(config.subscription_key.as_deref(), Some("env-key"));
        assert_eq!(config.voice, None); // empty values are ignored
        assert_eq!(config.speaking_rate, Some(1.5));
        assert_eq!(config.timeout_secs, Some(15));
        assert_eq!(config.save_audio, Some(false));
        assert_eq!(
            config.config_path,
            Some(PathBuf::from("/etc/azure-speech.yaml"))
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_numbers() {
        cleanup_env_vars();

        unsafe {
            env::set_var(ENV_TIMEOUT_SECS, "soon");
        }
        let result = EnvConfig::from_env();
        assert!(matches!(
            result,
            Err(SpeechCliError::Configuration(msg)) if msg.contains(ENV_TIMEOUT_SECS)
        ));

        cleanup_env_vars();
        unsafe {
            env::set_var(ENV_SAVE_AUDIO, "maybe");
        }
        assert!(EnvConfig::from_env().is_err());

        cleanup_env_vars();
    }
}
