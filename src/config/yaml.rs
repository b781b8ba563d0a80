use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{SpeechCliError, SpeechCliResult};

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Command-line flags
/// and environment variables override any values specified here.
///
/// # Example YAML structure
/// ```yaml
/// azure:
///   endpoint: "https://eastasia.api.cognitive.microsoft.com/sts/v1.0/issuetoken"
///   region: "eastasia"
///   subscription_key: "your-subscription-key"
///   voice: "zh-CN-XiaomoNeural"
///   output_format: "riff-24khz-16bit-mono-pcm"
///   speaking_rate: 1.0
///
/// run:
///   out: "speech.wav"
///   repeat: 1
///   timeout_secs: 60
///   save_audio: true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub azure: Option<AzureYaml>,
    pub run: Option<RunYaml>,
}

/// Azure speech resource configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AzureYaml {
    pub endpoint: Option<String>,
    /// Region where the Speech resource is deployed (e.g., "eastasia", "westus2")
    pub region: Option<String>,
    /// Subscription key from Azure Portal
    /// (Azure Portal → Speech resource → Keys and Endpoint → Key 1 or Key 2)
    pub subscription_key: Option<String>,
    pub voice: Option<String>,
    pub output_format: Option<String>,
    pub speaking_rate: Option<f32>,
}

/// Request loop configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RunYaml {
    pub out: Option<PathBuf>,
    pub repeat: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub save_audio: Option<bool>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> SpeechCliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SpeechCliError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            SpeechCliError::Configuration(format!("Failed to parse YAML config: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
azure:
  endpoint: "https://eastasia.api.cognitive.microsoft.com/sts/v1.0/issuetoken"
  region: "eastasia"
  subscription_key: "yaml-key"
  voice: "zh-CN-XiaoxiaoNeural"
  output_format: "audio-24khz-96kbitrate-mono-mp3"
  speaking_rate: 1.25

run:
  out: "speech.mp3"
  repeat: 0
  timeout_secs: 30
  save_audio: false
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let azure = config.azure.as_ref().unwrap();
        let run = config.run.as_ref().unwrap();

        assert_eq!(azure.region.as_deref(), Some("eastasia"));
        assert_eq!(azure.subscription_key.as_deref(), Some("yaml-key"));
        assert_eq!(azure.voice.as_deref(), Some("zh-CN-XiaoxiaoNeural"));
        assert_eq!(azure.speaking_rate, Some(1.25));
        assert_eq!(run.out, Some(PathBuf::from("speech.mp3")));
        assert_eq!(run.repeat, Some(0));
        assert_eq!(run.timeout_secs, Some(30));
        assert_eq!(run.save_audio, Some(false));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
azure:
  region: "westeurope"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            config.azure.as_ref().unwrap().region.as_deref(),
            Some("westeurope")
        );
        assert!(config.azure.as_ref().unwrap().subscription_key.is_none());
        assert!(config.run.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.azure.is_none());
        assert!(config.run.is_none());
    }

    #[test]
    fn test_yaml_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("speech.yaml");
        fs::write(&config_path, "run:\n  repeat: 5\n").unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(config.run.unwrap().repeat, Some(5));
    }

    #[test]
    fn test_yaml_from_file_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = YamlConfig::from_file(&temp_dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(SpeechCliError::Configuration(_))));

        let bad_path = temp_dir.path().join("bad.yaml");
        fs::write(&bad_path, "run:\n  repeat: [not, a, number]\n").unwrap();
        let malformed = YamlConfig::from_file(&bad_path);
        assert!(matches!(
            malformed,
            Err(SpeechCliError::Configuration(msg)) if msg.contains("parse")
        ));
    }
}
