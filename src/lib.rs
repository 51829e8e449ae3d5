// Public modules
pub mod app;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod conversation;
pub mod error;
pub mod ndjson;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use app::{Outcome, execute};
pub use client::{DEFAULT_HOST, FragmentStream, InferenceClient, Ollama, PullStream};
pub use client_logger::{ClientLogger, StderrLogger};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
