//! launch::report
//!
//! Progress reporting for the launch loop.
//!
//! Every message becomes a `tracing` event. It is also printed to stdout
//! and appended to a log file when those sinks are enabled. Sink failures
//! are logged and otherwise ignored; reporting never stops the loop.
//!
//! Only the lines of the current iteration are kept in memory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Writes launch progress to the configured sinks.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    stdout: bool,
    logfile: Option<PathBuf>,
    messages: Vec<String>,
}

impl Reporter {
    pub fn new(stdout: bool, logfile: Option<PathBuf>) -> Self {
        Self {
            stdout,
            logfile,
            messages: Vec::new(),
        }
    }

    /// Forget the lines of the previous iteration.
    pub fn start_iteration(&mut self) {
        self.messages.clear();
    }

    /// Emit one message to every sink.
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "pathbind::launch", "{message}");
        if self.stdout {
            println!("{message}");
        }
        if let Some(path) = &self.logfile {
            let written = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{message}"));
            if let Err(err) = written {
                tracing::warn!(path = %path.display(), error = %err, "failed to append to launch log");
            }
        }
        self.messages.push(message);
    }

    /// Messages reported since the last [`Reporter::start_iteration`].
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
