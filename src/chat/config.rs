//! Configuration types for the command-line front-end.
//!
//! This module provides the shared command-line options and the resolved
//! configuration every command runs with.

use getopts::{Matches, Options};

use crate::client::DEFAULT_HOST;

/// Model used whenever `--model` is omitted.
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Options shared by every command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use.
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    pub system: Option<String>,

    /// Address of the Ollama daemon.
    pub host: Option<String>,

    /// Disable ANSI colors and styles.
    pub no_color: bool,

    /// Log daemon requests to stderr.
    pub verbose: bool,
}

impl ChatArgs {
    /// Registers the shared options with a getopts parser.
    pub fn register(opts: &mut Options) {
        opts.optopt(
            "m",
            "model",
            &format!("Model to use (default: {DEFAULT_MODEL})"),
            "MODEL",
        );
        opts.optopt("s", "system", "System prompt", "PROMPT");
        opts.optopt(
            "",
            "host",
            &format!("Ollama address (default: {DEFAULT_HOST})"),
            "URL",
        );
        opts.optflag("", "no-color", "Disable ANSI colors/styles");
        opts.optflag("v", "verbose", "Log daemon requests to stderr");
    }

    /// Extracts the shared options from parsed arguments.
    pub fn from_matches(matches: &Matches) -> Self {
        Self {
            model: matches.opt_str("model"),
            system: matches.opt_str("system"),
            host: matches.opt_str("host"),
            no_color: matches.opt_present("no-color"),
            verbose: matches.opt_present("verbose"),
        }
    }
}

/// Configuration for a command.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Optional system prompt to set conversation context.
    pub system_prompt: Option<String>,

    /// Address of the Ollama daemon.
    pub host: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log daemon requests to stderr.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: llama3.1:8b
    /// - Host: http://127.0.0.1:11434
    /// - Color: enabled
    /// - Verbose: disabled
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            host: DEFAULT_HOST.to_string(),
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the daemon address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Enables request logging.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            model: args.model.unwrap_or(defaults.model),
            system_prompt: args.system,
            host: args.host.unwrap_or(defaults.host),
            use_color: !args.no_color,
            verbose: args.verbose,
        }
    }
}
