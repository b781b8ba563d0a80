//! Configuration module for the azure-speech command line
//!
//! Settings come from command-line flags, `AZURE_SPEECH_*` environment
//! variables (including a `.env` file) and an optional YAML file. Flags win over
//! the environment, which wins over the YAML file.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging the layers into one configuration
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use azure_speech_cli::cli::Cli;
//! use azure_speech_cli::config::SpeechCliConfig;
//! use clap::Parser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cli = Cli::parse();
//! let config = SpeechCliConfig::load(&cli)?;
//! println!("Using voice {}", config.voice);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::cli::Cli;
use crate::core::providers::azure::mask_subscription_key;
use crate::core::runner::RunnerOptions;
use crate::core::tts::SpeechSettings;
use crate::errors::SpeechCliResult;

pub mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use env::EnvConfig;
pub use merge::merge_config;
pub use utils::parse_bool;
pub use yaml::{AzureYaml, RunYaml, YamlConfig};

/// Seconds to wait for a synthesis outcome.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Requests per run.
pub const DEFAULT_REPEAT: u32 = 1;

/// Merged command-line configuration
#[derive(Clone)]
pub struct SpeechCliConfig {
    // Azure speech resource
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub subscription_key: String,
    pub voice: String,
    pub output_format: Option<String>,
    pub speaking_rate: Option<f32>,

    // Request loop
    pub out: Option<PathBuf>,
    pub repeat: u32,
    pub timeout_secs: u64,
    pub save_audio: bool,
}

impl std::fmt::Debug for SpeechCliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechCliConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field(
                "subscription_key",
                &mask_subscription_key(&self.subscription_key),
            )
            .field("voice", &self.voice)
            .field("output_format", &self.output_format)
            .field("speaking_rate", &self.speaking_rate)
            .field("out", &self.out)
            .field("repeat", &self.repeat)
            .field("timeout_secs", &self.timeout_secs)
            .field("save_audio", &self.save_audio)
            .finish()
    }
}

impl SpeechCliConfig {
    /// Load configuration from flags, environment variables and the YAML file
    ///
    /// The YAML file is taken from `--config`, falling back to `AZURE_SPEECH_CONFIG`.
    ///
    /// # Errors
    /// Returns a configuration error if:
    /// - An environment variable has an invalid format
    /// - The YAML file cannot be read or is malformed
    /// - The merged configuration fails validation
    pub fn load(cli: &Cli) -> SpeechCliResult<Self> {
        let env_config = EnvConfig::from_env()?;

        let config_path = cli.config.clone().or_else(|| env_config.config_path.clone());
        let yaml_config = match config_path.as_deref() {
            Some(path) => {
                debug!("Loading configuration file {}", path.display());
                Some(YamlConfig::from_file(path)?)
            }
            None => None,
        };

        let config = merge_config(cli, env_config, yaml_config);
        config.validate()?;

        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate the merged configuration
    ///
    /// Endpoint, subscription key and voice are checked when the synthesizer is
    /// created.
    pub fn validate(&self) -> SpeechCliResult<()> {
        validation::validate_timeout(self.timeout_secs)?;
        validation::validate_speaking_rate(self.speaking_rate)?;
        validation::validate_output_format(self.output_format.as_deref())?;
        Ok(())
    }

    /// Settings the synthesizer is built from
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            subscription_key: self.subscription_key.clone(),
            voice_name: Some(self.voice.clone()),
            output_format: self.output_format.clone(),
            speaking_rate: self.speaking_rate,
        }
    }

    /// Options of the request loop
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            repeat: self.repeat,
            out: self.out.clone(),
            save_audio: self.save_audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SpeechCliError;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            for name in [
                env::ENV_ENDPOINT,
                env::ENV_SUBSCRIPTION_KEY,
                env::ENV_REGION,
                env::ENV_VOICE,
                env::ENV_OUTPUT_FORMAT,
                env::ENV_RATE,
                env::ENV_TIMEOUT_SECS,
                env::ENV_SAVE_AUDIO,
                env::ENV_CONFIG,
            ] {
                std::env::remove_var(name);
            }
        }
    }

    fn cli() -> Cli {
        Cli {
            text: "hello".to_string(),
            ..Default::default()
        }
    }

    #[test]
    #[serial]
    fn test_load_from_yaml_file_with_env_override() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("speech.yaml");
        fs::write(
            &config_path,
            r#"
azure:
  region: "eastasia"
  subscription_key: "yaml-key"
run:
  timeout_secs: 30
"#,
        )
        .unwrap();

        unsafe {
            std::env::set_var(env::ENV_CONFIG, &config_path);
            std::env::set_var(env::ENV_SUBSCRIPTION_KEY, "env-key");
        }

        let config = SpeechCliConfig::load(&cli()).unwrap();

        assert_eq!(config.region.as_deref(), Some("eastasia"));
        assert_eq!(config.subscription_key, "env-key");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.voice, "zh-CN-XiaomoNeural");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_load_rejects_invalid_values() {
        cleanup_env_vars();

        let zero_timeout = Cli {
            timeout_secs: Some(0),
            ..cli()
        };
        assert!(matches!(
            SpeechCliConfig::load(&zero_timeout),
            Err(SpeechCliError::Configuration(_))
        ));

        let bad_format = Cli {
            format: Some("flac".to_string()),
            ..cli()
        };
        assert!(SpeechCliConfig::load(&bad_format).is_err());

        let missing_file = Cli {
            config: Some(PathBuf::from("/nonexistent/speech.yaml")),
            ..cli()
        };
        assert!(SpeechCliConfig::load(&missing_file).is_err());

        cleanup_env_vars();
    }

    #[test]
    fn test_speech_settings_and_runner_options() {
        let config = merge_config(
            &Cli {
                region: Some("westus2".to_string()),
                subscription_key: Some("secret-key-1234".to_string()),
                out: Some("out.wav".to_string()),
                repeat: Some(2),
                ..cli()
            },
            EnvConfig::default(),
            None,
        );

        let settings = config.speech_settings();
        assert_eq!(settings.region.as_deref(), Some("westus2"));
        assert_eq!(settings.subscription_key, "secret-key-1234");
        assert_eq!(settings.voice_name.as_deref(), Some("zh-CN-XiaomoNeural"));

        let options = config.runner_options();
        assert_eq!(options.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(options.repeat, 2);
        assert_eq!(options.out, Some(PathBuf::from("out.wav")));
        assert!(options.save_audio);

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key-1234"));
        assert!(debug.contains("1234"));
    }
}
