//! Command execution.
//!
//! [`execute`] runs one parsed [`Invocation`] against an [`InferenceClient`],
//! writing everything through a [`Renderer`]. Daemon failures are reported here
//! and turned into an [`Outcome`]; they never escape as errors.

use std::process::ExitCode;

use futures::StreamExt;

use crate::chat::{
    ChatConfig, ChatSession, Command, DAEMON_HINT, Invocation, LineReader, help_text,
    stream_reply,
};
use crate::client::InferenceClient;
use crate::conversation::Conversation;
use crate::error::Error;
use crate::render::Renderer;

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Runs one command to completion.
pub async fn execute(
    invocation: Invocation,
    client: &dyn InferenceClient,
    renderer: &mut dyn Renderer,
    reader: &mut dyn LineReader,
) -> Outcome {
    let Invocation { command, config } = invocation;
    match command {
        Command::Ask(prompt) | Command::Quick(Some(prompt)) => {
            ask(client, &config, &prompt, renderer).await
        }
        Command::Quick(None) => {
            renderer.print_banner();
            renderer.print_help(&help_text());
            Outcome::Success
        }
        Command::Chat => chat(client, config, renderer, reader).await,
        Command::Models => list_models(client, renderer).await,
        Command::Pull(model) => pull_model(client, &model, renderer).await,
        Command::Help => {
            renderer.print_help(&help_text());
            Outcome::Success
        }
        Command::Version => {
            renderer.print_info(&format!("miyu {}", env!("CARGO_PKG_VERSION")));
            Outcome::Success
        }
    }
}

/// One-shot question: stream a single reply and exit.
pub async fn ask(
    client: &dyn InferenceClient,
    config: &ChatConfig,
    prompt: &str,
    renderer: &mut dyn Renderer,
) -> Outcome {
    let mut conversation = Conversation::new(config.system_prompt.as_deref());
    conversation.push_user(prompt);

    renderer.start_status("Thinking...");
    let fragments = match client.chat(&config.model, conversation.messages()).await {
        Ok(fragments) => fragments,
        Err(err) => {
            renderer.fail_status(&err.to_string());
            hint_on_connection(&err, renderer);
            return Outcome::Failure;
        }
    };
    match stream_reply(fragments, renderer, false).await {
        Ok(_) => Outcome::Success,
        Err(err) => {
            renderer.print_error(&err.to_string());
            hint_on_connection(&err, renderer);
            Outcome::Failure
        }
    }
}

/// Interactive chat until the user leaves.
pub async fn chat(
    client: &dyn InferenceClient,
    config: ChatConfig,
    renderer: &mut dyn Renderer,
    reader: &mut dyn LineReader,
) -> Outcome {
    renderer.print_banner();
    renderer.print_session_header(&config.model);
    let mut session = ChatSession::new(client, config);
    if let Err(err) = session.run(reader, renderer).await {
        renderer.print_error(&err.to_string());
    }
    Outcome::Success
}

/// Prints the models installed on the daemon.
pub async fn list_models(client: &dyn InferenceClient, renderer: &mut dyn Renderer) -> Outcome {
    renderer.start_status("Loading models...");
    match client.list().await {
        Ok(models) => {
            renderer.stop_status();
            renderer.print_heading("Available Models");
            if models.is_empty() {
                renderer.print_info("  No models installed");
            }
            for model in &models {
                renderer.print_model_row(&model.name, &model.size_text());
            }
        }
        Err(err) => {
            renderer.fail_status(&err.to_string());
            renderer.print_hint(DAEMON_HINT);
        }
    }
    Outcome::Success
}

/// Downloads a model, showing each progress status.
pub async fn pull_model(
    client: &dyn InferenceClient,
    model: &str,
    renderer: &mut dyn Renderer,
) -> Outcome {
    renderer.start_status(&format!("Pulling {model}..."));
    let mut events = match client.pull(model).await {
        Ok(events) => events,
        Err(err) => {
            renderer.fail_status(&err.to_string());
            hint_on_connection(&err, renderer);
            return Outcome::Success;
        }
    };
    while let Some(event) = events.next().await {
        match event {
            Ok(event) if !event.status.is_empty() => renderer.update_status(&event.status_text()),
            Ok(_) => {}
            Err(err) => {
                renderer.fail_status(&err.to_string());
                hint_on_connection(&err, renderer);
                return Outcome::Success;
            }
        }
    }
    renderer.succeed_status(&format!("{model} ready!"));
    Outcome::Success
}

fn hint_on_connection(err: &Error, renderer: &mut dyn Renderer) {
    if err.is_connection() {
        renderer.print_hint(DAEMON_HINT);
    }
}
