use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use azure_speech_cli::cli::Cli;
use azure_speech_cli::config::SpeechCliConfig;
use azure_speech_cli::core::{AzureSynthesizerFactory, StatusReporter, SynthesisRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize tracing on stderr; stdout carries the status lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SpeechCliConfig::load(&cli).context("failed to load configuration")?;

    let runner = SynthesisRunner::new(
        Arc::new(AzureSynthesizerFactory),
        StatusReporter::stdout(),
        config.runner_options(),
    );

    let summary = runner
        .run(&cli.text, &config.speech_settings())
        .await
        .inspect_err(|e| tracing::error!("{}", e))?;

    tracing::info!(
        iterations = summary.iterations,
        completed = summary.completed,
        canceled = summary.canceled,
        "Done"
    );

    Ok(())
}
