//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Synthesize text with Azure Speech Services.
///
/// Without `--out` the audio is played on the default speaker. With `--out`
/// it is read from the service as a byte stream and written to the file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "azure-speech")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Text-to-speech with Azure Speech Services")]
pub struct Cli {
    /// Speech endpoint URL [env: AZURE_SPEECH_ENDPOINT]
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    /// Subscription key of the speech resource [env: AZURE_SPEECH_SUBSCRIPTION_KEY]
    #[arg(short = 'k', long)]
    pub subscription_key: Option<String>,

    /// Voice name, e.g. zh-CN-XiaomoNeural [env: AZURE_SPEECH_VOICE]
    #[arg(short = 'v', long)]
    pub voice: Option<String>,

    /// Text to synthesize
    #[arg(short = 't', long)]
    pub text: String,

    /// Output file; selects the capture path, an empty value keeps the speaker
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: Option<String>,

    /// Region used when no endpoint is given, e.g. eastasia [env: AZURE_SPEECH_REGION]
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Output format, e.g. riff-24khz-16bit-mono-pcm [env: AZURE_SPEECH_OUTPUT_FORMAT]
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Number of requests, 0 repeats until interrupted
    #[arg(short = 'n', long)]
    pub repeat: Option<u32>,

    /// Seconds to wait for each synthesis outcome [env: AZURE_SPEECH_TIMEOUT_SECS]
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Speaking rate multiplier between 0.5 and 2.0 [env: AZURE_SPEECH_RATE]
    #[arg(long)]
    pub rate: Option<f32>,

    /// Count the captured bytes without writing the output file
    #[arg(long)]
    pub no_save: bool,

    /// YAML configuration file [env: AZURE_SPEECH_CONFIG]
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
