//! Console observer for synthesis lifecycle notifications.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use super::base::{SynthesisEventArgs, SynthesisEventHandler};
use crate::core::report::StatusReporter;

/// Prints one status line per lifecycle notification.
#[derive(Clone)]
pub struct ConsoleEventLogger {
    reporter: StatusReporter,
}

impl ConsoleEventLogger {
    pub fn new(reporter: StatusReporter) -> Self {
        Self { reporter }
    }
}

impl SynthesisEventHandler for ConsoleEventLogger {
    fn on_synthesis_started(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            debug!(result_id = %event.result_id, "synthesis started");
            self.reporter.line("Synthesis started.");
        })
    }

    fn on_synthesizing(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.reporter.line(format!(
                "Synthesizing, audio chunk size {}.",
                event.audio_chunk_len
            ));
        })
    }

    fn on_synthesis_completed(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            debug!(result_id = %event.result_id, "synthesis completed");
            self.reporter
                .line(format!("Synthesized, audio length {}.", event.audio_len));
        })
    }

    fn on_synthesis_canceled(
        &self,
        event: SynthesisEventArgs,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Some(details) = &event.cancellation {
                debug!(result_id = %event.result_id, %details, "synthesis canceled");
            }
            self.reporter.line("Received a cancellation.");
        })
    }
}
