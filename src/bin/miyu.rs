//! Chat with local Ollama models from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Ask one question
//! miyu ask "why is the sky blue"
//!
//! # Same thing, without the subcommand
//! miyu why is the sky blue -m llama3.2:1b
//!
//! # Interactive session with a system prompt
//! miyu chat --system "You are a helpful coding assistant"
//!
//! # Manage models
//! miyu models
//! miyu pull llama3.2:1b
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use miyu::chat::{EditorReader, parse_args};
use miyu::{Ollama, PlainTextRenderer, StderrLogger, execute};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("Try 'miyu --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    let config = &invocation.config;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let client = match Ollama::with_options(Some(&config.host), None) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let client = if config.verbose {
        client.with_logger(Arc::new(StderrLogger::new(config.use_color)))
    } else {
        client
    };

    let mut reader = EditorReader::new();
    execute(invocation, &client, &mut renderer, &mut reader)
        .await
        .into()
}
