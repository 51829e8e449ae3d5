use serde::{Deserialize, Serialize};

/// Metadata about a model installed on the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model tag, e.g. `llama3.1:8b`.
    pub name: String,

    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,

    /// Content digest of the model manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Last modification time as reported by the daemon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl ModelDescriptor {
    /// Create a new `ModelDescriptor` with the given name and size.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            digest: None,
            modified_at: None,
        }
    }

    /// Size in decimal gigabytes, rounded to one decimal place.
    pub fn size_text(&self) -> String {
        format_size(self.size)
    }
}

/// Formats a byte count as decimal gigabytes with one decimal place.
pub fn format_size(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / 1e9)
}

/// Response from `GET /api/tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelListResponse {
    /// Installed models.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}
