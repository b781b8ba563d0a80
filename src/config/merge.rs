use std::path::PathBuf;

use super::env::EnvConfig;
use super::utils::non_empty;
use super::yaml::YamlConfig;
use super::{DEFAULT_REPEAT, DEFAULT_TIMEOUT_SECS, SpeechCliConfig};
use crate::cli::Cli;
use crate::core::tts::azure::DEFAULT_VOICE_NAME;

/// Merge command-line flags, environment variables and YAML configuration
///
/// Priority order (highest to lowest):
/// 1. Command-line flags
/// 2. Environment variables
/// 3. YAML configuration values
/// 4. Default values
///
/// Empty strings are treated as unset at every layer.
pub fn merge_config(cli: &Cli, env: EnvConfig, yaml_config: Option<YamlConfig>) -> SpeechCliConfig {
    let yaml = yaml_config.unwrap_or_default();
    let azure = yaml.azure.unwrap_or_default();
    let run = yaml.run.unwrap_or_default();

    // Helper macro for string values: CLI > ENV > YAML
    macro_rules! get_string {
        ($cli_value:expr, $env_value:expr, $yaml_value:expr) => {
            non_empty($cli_value.clone())
                .or($env_value)
                .or_else(|| non_empty($yaml_value))
        };
    }

    let endpoint = get_string!(cli.endpoint, env.endpoint, azure.endpoint);
    let region = get_string!(cli.region, env.region, azure.region);
    let subscription_key =
        get_string!(cli.subscription_key, env.subscription_key, azure.subscription_key)
            .unwrap_or_default();
    let voice = get_string!(cli.voice, env.voice, azure.voice)
        .unwrap_or_else(|| DEFAULT_VOICE_NAME.to_string());
    let output_format = get_string!(cli.format, env.output_format, azure.output_format);

    let speaking_rate = cli.rate.or(env.speaking_rate).or(azure.speaking_rate);

    let out = non_empty(cli.out.clone())
        .map(PathBuf::from)
        .or_else(|| run.out.filter(|p| !p.as_os_str().is_empty()));
    let repeat = cli.repeat.or(run.repeat).unwrap_or(DEFAULT_REPEAT);
    let timeout_secs = cli
        .timeout_secs
        .or(env.timeout_secs)
        .or(run.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    // --no-save can only switch saving off
    let save_audio = !cli.no_save && env.save_audio.or(run.save_audio).unwrap_or(true);

    SpeechCliConfig {
        endpoint,
        region,
        subscription_key,
        voice,
        output_format,
        speaking_rate,
        out,
        repeat,
        timeout_secs,
        save_audio,
    }
}

#[cfg(test)]
mod tests {
    use super::super::yaml::{AzureYaml, RunYaml};
    use super::*;

    fn cli() -> Cli {
        Cli {
            text: "hello".to_string(),
            ..Default::default()
        }
    }

    fn yaml() -> YamlConfig {
        YamlConfig {
            azure: Some(AzureYaml {
                endpoint: Some("https://yaml.example.com/tts".to_string()),
                region: Some("westeurope".to_string()),
                subscription_key: Some("yaml-key".to_string()),
                voice: Some("en-GB-SoniaNeural".to_string()),
                output_format: Some("mp3".to_string()),
                speaking_rate: Some(0.9),
            }),
            run: Some(RunYaml {
                out: Some(PathBuf::from("yaml.wav")),
                repeat: Some(4),
                timeout_secs: Some(20),
                save_audio: Some(false),
            }),
        }
    }

    #[test]
    fn test_merge_defaults_when_nothing_set() {
        let config = merge_config(&cli(), EnvConfig::default(), None);

        assert_eq!(config.endpoint, None);
        assert_eq!(config.region, None);
        assert_eq!(config.subscription_key, "");
        assert_eq!(config.voice, DEFAULT_VOICE_NAME);
        assert_eq!(config.output_format, None);
        assert_eq!(config.out, None);
        assert_eq!(config.repeat, DEFAULT_REPEAT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.save_audio);
    }

    #[test]
    fn test_merge_yaml_only() {
        let config = merge_config(&cli(), EnvConfig::default(), Some(yaml()));

        assert_eq!(config.endpoint.as_deref(), Some("https://yaml.example.com/tts"));
        assert_eq!(config.subscription_key, "yaml-key");
        assert_eq!(config.voice, "en-GB-SoniaNeural");
        assert_eq!(config.output_format.as_deref(), Some("mp3"));
        assert_eq!(config.speaking_rate, Some(0.9));
        assert_eq!(config.out, Some(PathBuf::from("yaml.wav")));
        assert_eq!(config.repeat, 4);
        assert_eq!(config.timeout_secs, 20);
        assert!(!config.save_audio);
    }

    #[test]
    fn test_merge_env_overrides_yaml() {
        let env = EnvConfig {
            subscription_key: Some("env-key".to_string()),
            voice: Some("de-DE-KatjaNeural".to_string()),
            timeout_secs: Some(5),
            save_audio: Some(true),
            ..Default::default()
        };

        let config = merge_config(&cli(), env, Some(yaml()));

        assert_eq!(config.subscription_key, "env-key"); // ENV overrides YAML
        assert_eq!(config.voice, "de-DE-KatjaNeural"); // ENV overrides YAML
        assert_eq!(config.timeout_secs, 5); // ENV overrides YAML
        assert!(config.save_audio); // ENV overrides YAML
        assert_eq!(config.region.as_deref(), Some("westeurope")); // from YAML
    }

    #[test]
    fn test_merge_cli_overrides_env_and_yaml() {
        let cli = Cli {
            subscription_key: Some("cli-key".to_string()),
            endpoint: Some("".to_string()),
            out: Some("cli.mp3".to_string()),
            repeat: Some(0),
            timeout_secs: Some(90),
            rate: Some(1.2),
            no_save: true,
            ..cli()
        };
        let env = EnvConfig {
            subscription_key: Some("env-key".to_string()),
            endpoint: Some("https://env.example.com/tts".to_string()),
            timeout_secs: Some(5),
            save_audio: Some(true),
            ..Default::default()
        };

        let config = merge_config(&cli, env, Some(yaml()));

        assert_eq!(config.subscription_key, "cli-key");
        // An empty flag falls through to the next layer
        assert_eq!(config.endpoint.as_deref(), Some("https://env.example.com/tts"));
        assert_eq!(config.out, Some(PathBuf::from("cli.mp3")));
        assert_eq!(config.repeat, 0);
        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.speaking_rate, Some(1.2));
        assert!(!config.save_audio);
    }

    #[test]
    fn test_merge_empty_out_selects_speaker() {
        let cli = Cli {
            out: Some(String::new()),
            ..cli()
        };
        let config = merge_config(&cli, EnvConfig::default(), None);
        assert_eq!(config.out, None);

        let mut yaml = yaml();
        if let Some(run) = yaml.run.as_mut() {
            run.out = Some(PathBuf::new());
        }
        let config = merge_config(&cli, EnvConfig::default(), Some(yaml));
        assert_eq!(config.out, None);
    }
}
