pub mod cli;
pub mod config;
pub mod core;
pub mod errors;

// Re-export commonly used items for convenience
pub use config::SpeechCliConfig;
pub use core::*;
pub use errors::{SpeechCliError, SpeechCliResult};
