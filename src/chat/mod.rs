//! Command-line front-end for talking to a local Ollama daemon.
//!
//! This module provides the pieces the `miyu` binary is assembled from:
//!
//! - Streaming replies with real-time fragment display
//! - An interactive loop that keeps the whole conversation
//! - Configurable model, system prompt, and daemon address
//!
//! # Architecture
//!
//! - [`config`]: shared options and the resolved configuration
//! - [`commands`]: argument parsing into a single command
//! - [`session`]: the interactive chat state machine

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{Command, Invocation, help_text, parse_args};
pub use config::{ChatArgs, ChatConfig, DEFAULT_MODEL};
pub use session::{ChatSession, ChatState, DAEMON_HINT, EditorReader, LineReader, stream_reply};
