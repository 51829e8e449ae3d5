use serde::{Deserialize, Serialize};

/// Error payload the daemon returns, either as a response body or in-band in a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}
