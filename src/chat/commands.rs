//! Command-line parsing for miyu.
//!
//! This module turns process arguments into exactly one [`Command`] plus the
//! shared [`ChatConfig`]. Options may appear anywhere on the command line.

use getopts::Options;

use crate::chat::config::{ChatArgs, ChatConfig};
use crate::error::{Error, Result};

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a single question and exit.
    Ask(String),

    /// Start an interactive chat session.
    Chat,

    /// List available models.
    Models,

    /// Download a model.
    Pull(String),

    /// Free text without a subcommand. `None` shows the banner and help.
    Quick(Option<String>),

    /// Show usage.
    Help,

    /// Show the version.
    Version,
}

/// A command together with the configuration it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The selected command.
    pub command: Command,

    /// Options resolved against their defaults.
    pub config: ChatConfig,
}

fn options() -> Options {
    let mut opts = Options::new();
    ChatArgs::register(&mut opts);
    opts.optflag("h", "help", "Display help for command");
    opts.optflag("V", "version", "Output the version number");
    opts
}

/// Parses process arguments (without the program name).
///
/// # Errors
///
/// Returns a validation error for unknown options, options missing their
/// value, and commands with missing or extra arguments.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation> {
    let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
    let matches = options().parse(args)?;
    let config = ChatConfig::from(ChatArgs::from_matches(&matches));
    let invocation = |command| Ok(Invocation { command, config });

    if matches.opt_present("help") {
        return invocation(Command::Help);
    }
    if matches.opt_present("version") {
        return invocation(Command::Version);
    }

    let mut free = matches.free.into_iter();
    let Some(first) = free.next() else {
        return invocation(Command::Quick(None));
    };
    let rest: Vec<String> = free.collect();

    match first.as_str() {
        "ask" => {
            let prompt = join_prompt(&rest);
            if prompt.is_empty() {
                return Err(Error::validation(
                    "missing required argument",
                    Some("prompt".to_string()),
                ));
            }
            invocation(Command::Ask(prompt))
        }
        "chat" => {
            no_arguments("chat", &rest)?;
            invocation(Command::Chat)
        }
        "models" => {
            no_arguments("models", &rest)?;
            invocation(Command::Models)
        }
        "pull" => match rest.as_slice() {
            [model] if !model.trim().is_empty() => {
                invocation(Command::Pull(model.trim().to_string()))
            }
            [] | [_] => Err(Error::validation(
                "missing required argument",
                Some("model".to_string()),
            )),
            _ => Err(Error::validation(
                format!("too many arguments for 'pull': expected 1, got {}", rest.len()),
                None,
            )),
        },
        "help" => invocation(Command::Help),
        _ => {
            let mut words = vec![first];
            words.extend(rest);
            let prompt = join_prompt(&words);
            if prompt.is_empty() {
                invocation(Command::Quick(None))
            } else {
                invocation(Command::Quick(Some(prompt)))
            }
        }
    }
}

fn join_prompt(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

fn no_arguments(command: &str, rest: &[String]) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(
            format!("too many arguments for '{command}': unexpected '{}'", rest.join(" ")),
            None,
        ))
    }
}

/// Returns the help text for the program.
pub fn help_text() -> String {
    let brief = "Usage: miyu [OPTIONS] [COMMAND] [PROMPT...]\n\nChat with your local Ollama models";
    let mut help = options().usage(brief);
    help.push_str(
        r#"
Commands:
    ask <PROMPT...>     Ask a single question
    chat                Start an interactive chat session
    models              List available models
    pull <MODEL>        Pull a model from the Ollama registry
    help                Display help for command

Without a command, the remaining words are sent as a quick prompt.
"#,
    );
    help
}
