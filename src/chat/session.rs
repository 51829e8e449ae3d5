//! Interactive chat session.
//!
//! This module provides the `ChatSession` state machine, which owns the
//! conversation for one interactive loop, and the `LineReader` abstraction it
//! reads input through.

use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::config::ChatConfig;
use crate::client::{FragmentStream, InferenceClient};
use crate::conversation::Conversation;
use crate::error::Result;
use crate::observability::{CHAT_TURN_ERRORS, CHAT_TURNS};
use crate::render::Renderer;

/// Hint printed when the daemon cannot be reached.
pub const DAEMON_HINT: &str = "Is Ollama running? Try: ollama serve";

/// Source of input lines for the interactive loop.
pub trait LineReader {
    /// Reads one line, showing `prompt`.
    ///
    /// Returns `Ok(None)` at end of input or when the user interrupts at the prompt.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads lines from the terminal with rustyline line editing and history.
///
/// The editor is created on first use, so constructing the reader never
/// touches the terminal.
#[derive(Default)]
pub struct EditorReader {
    editor: Option<DefaultEditor>,
}

impl EditorReader {
    /// Creates a new EditorReader.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let editor = match self.editor.take() {
            Some(editor) => editor,
            None => DefaultEditor::new()?,
        };
        let editor = self.editor.insert(editor);
        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// States of the interactive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// Waiting for the next line of input.
    AwaitingInput,

    /// A user message was appended; the reply has not been streamed yet.
    AwaitingResponse,

    /// The user left; no more input is read.
    Closed,
}

/// A chat session that manages conversation state and daemon interactions.
///
/// The full conversation is resent on every turn; the daemon keeps no session
/// state.
pub struct ChatSession<'a, C: InferenceClient + ?Sized> {
    client: &'a C,
    config: ChatConfig,
    conversation: Conversation,
    state: ChatState,
    turns: u64,
    failed_turns: u64,
}

impl<'a, C: InferenceClient + ?Sized> ChatSession<'a, C> {
    /// Creates a new chat session, seeding the system prompt from the configuration.
    pub fn new(client: &'a C, config: ChatConfig) -> Self {
        let conversation = Conversation::new(config.system_prompt.as_deref());
        Self {
            client,
            config,
            conversation,
            state: ChatState::AwaitingInput,
            turns: 0,
            failed_turns: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Returns the conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the model replies are requested from.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Number of turns sent to the daemon, and how many of them failed.
    pub fn turn_counts(&self) -> (u64, u64) {
        (self.turns, self.failed_turns)
    }

    /// Runs the loop until the session is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails for a reason other than end of
    /// input or interrupt. The session is closed in that case.
    pub async fn run(
        &mut self,
        reader: &mut dyn LineReader,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        while self.state != ChatState::Closed {
            self.step(reader, renderer).await?;
        }
        Ok(())
    }

    /// Performs one transition of the state machine.
    pub async fn step(
        &mut self,
        reader: &mut dyn LineReader,
        renderer: &mut dyn Renderer,
    ) -> Result<ChatState> {
        match self.state {
            ChatState::AwaitingInput => {
                let prompt = renderer.prompt();
                match reader.read_line(&prompt) {
                    Ok(Some(line)) => {
                        self.handle_line(&line, renderer);
                    }
                    Ok(None) => {
                        renderer.print_farewell();
                        self.state = ChatState::Closed;
                    }
                    Err(err) => {
                        self.state = ChatState::Closed;
                        return Err(err);
                    }
                }
            }
            ChatState::AwaitingResponse => self.respond(renderer).await,
            ChatState::Closed => {}
        }
        Ok(self.state)
    }

    /// Applies one line of input in the `AwaitingInput` state.
    ///
    /// Lines are stored as typed; only a line terminator is removed.
    pub fn handle_line(&mut self, line: &str, renderer: &mut dyn Renderer) -> ChatState {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return self.state;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            renderer.print_farewell();
            self.state = ChatState::Closed;
            return self.state;
        }
        self.conversation.push_user(line);
        self.state = ChatState::AwaitingResponse;
        self.state
    }

    /// Streams the reply to the pending user message.
    ///
    /// The assistant message is appended only after the whole stream was
    /// consumed. On failure the user message stays in the conversation.
    async fn respond(&mut self, renderer: &mut dyn Renderer) {
        renderer.print_pending();
        self.turns += 1;
        CHAT_TURNS.click();

        let result = match self
            .client
            .chat(&self.config.model, self.conversation.messages())
            .await
        {
            Ok(fragments) => stream_reply(fragments, renderer, true).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(reply) => self.conversation.push_assistant(reply),
            Err(err) => {
                self.failed_turns += 1;
                CHAT_TURN_ERRORS.click();
                renderer.print_error(&err.to_string());
                if err.is_connection() {
                    renderer.print_hint(DAEMON_HINT);
                }
            }
        }
        self.state = ChatState::AwaitingInput;
    }
}

/// Writes every fragment to the renderer as it arrives and returns their concatenation.
///
/// # Errors
///
/// Returns the first error the stream yields; fragments printed before it are
/// not returned.
pub async fn stream_reply(
    mut fragments: FragmentStream,
    renderer: &mut dyn Renderer,
    nested: bool,
) -> Result<String> {
    renderer.start_response(nested);
    let mut reply = String::new();
    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                renderer.print_text(&text);
                reply.push_str(&text);
            }
            Err(err) => {
                renderer.finish_response();
                return Err(err);
            }
        }
    }
    renderer.finish_response();
    Ok(reply)
}
