//! Human-readable status lines.
//!
//! Status lines are the program's output and go to stdout. Diagnostics go
//! through `tracing` to stderr. The reporter can also capture lines in memory,
//! which is how the orchestrator is observed in tests.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone)]
enum Sink {
    Stdout,
    Memory(Arc<Mutex<Vec<String>>>),
}

/// Shared writer for status lines.
#[derive(Clone)]
pub struct StatusReporter {
    sink: Sink,
}

impl StatusReporter {
    /// Reporter printing to stdout.
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Reporter recording lines in memory.
    pub fn capture() -> Self {
        Self {
            sink: Sink::Memory(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Emits one status line. Multi-line messages are split.
    pub fn line(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        match &self.sink {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                // A closed stdout must not abort synthesis.
                let _ = writeln!(stdout, "{message}");
                let _ = stdout.flush();
            }
            Sink::Memory(lines) => {
                lines
                    .lock()
                    .extend(message.lines().map(|line| line.to_string()));
            }
        }
    }

    /// Lines recorded so far. Always empty for the stdout reporter.
    pub fn captured_lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Stdout => Vec::new(),
            Sink::Memory(lines) => lines.lock().clone(),
        }
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_lines_across_clones() {
        let reporter = StatusReporter::capture();
        let clone = reporter.clone();

        reporter.line("first");
        clone.line("second\nthird");

        assert_eq!(reporter.captured_lines(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_stdout_reporter_captures_nothing() {
        let reporter = StatusReporter::stdout();
        reporter.line("visible on stdout");
        assert!(reporter.captured_lines().is_empty());
    }
}
