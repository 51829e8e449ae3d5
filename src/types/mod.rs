// Public modules
pub mod chat_chunk;
pub mod chat_request;
pub mod error_body;
pub mod message;
pub mod model_descriptor;
pub mod pull_progress;

// Re-exports
pub use chat_chunk::ChatChunk;
pub use chat_request::{ChatRequest, PullRequest};
pub use error_body::ErrorBody;
pub use message::{Message, MessageRole};
pub use model_descriptor::{ModelDescriptor, ModelListResponse, format_size};
pub use pull_progress::PullProgress;
