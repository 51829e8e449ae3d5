//! Logging trait for Ollama client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all interactions passing through the [`Ollama`](crate::Ollama) client,
//! along with [`StderrLogger`], the implementation behind `miyu --verbose`.

use std::io::{self, Write};

use crate::{ChatChunk, Error, PullProgress};

/// A trait for logging Ollama client operations.
///
/// Implement this trait to capture requests, the final chunk of every chat
/// stream, pull progress events and failures.
///
/// # Example
///
/// ```rust,ignore
/// use miyu::{ChatChunk, ClientLogger, Error, PullProgress};
/// use std::sync::Mutex;
///
/// struct TokenCounter(Mutex<u64>);
///
/// impl ClientLogger for TokenCounter {
///     fn log_request(&self, method: &str, url: &str) {}
///     fn log_chat_done(&self, chunk: &ChatChunk) {
///         *self.0.lock().unwrap() += chunk.eval_count.unwrap_or(0);
///     }
///     fn log_pull_event(&self, event: &PullProgress) {}
///     fn log_error(&self, error: &Error) {}
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request before it is sent.
    fn log_request(&self, method: &str, url: &str);

    /// Log the terminal chunk of a chat stream (`done: true`).
    fn log_chat_done(&self, chunk: &ChatChunk);

    /// Log one pull progress event as it is decoded.
    fn log_pull_event(&self, event: &PullProgress);

    /// Log a failed request or stream item.
    fn log_error(&self, error: &Error);
}

/// Writes one dim line per operation to stderr.
#[derive(Debug, Clone)]
pub struct StderrLogger {
    use_color: bool,
}

impl StderrLogger {
    /// Creates a new StderrLogger.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn line(&self, text: &str) {
        let mut stderr = io::stderr().lock();
        let _ = if self.use_color {
            writeln!(stderr, "\x1b[2m[miyu] {text}\x1b[0m")
        } else {
            writeln!(stderr, "[miyu] {text}")
        };
    }
}

impl ClientLogger for StderrLogger {
    fn log_request(&self, method: &str, url: &str) {
        self.line(&format!("{method} {url}"));
    }

    fn log_chat_done(&self, chunk: &ChatChunk) {
        // The response text has no trailing newline yet.
        eprintln!();
        self.line(&format!(
            "done: {} ({} tokens)",
            chunk.done_reason.as_deref().unwrap_or("unknown"),
            chunk.eval_count.unwrap_or(0)
        ));
    }

    fn log_pull_event(&self, event: &PullProgress) {
        self.line(&format!("pull: {}", event.status_text()));
    }

    fn log_error(&self, error: &Error) {
        self.line(&format!("error: {error}"));
    }
}
