use serde::{Deserialize, Serialize};

/// One progress event emitted while the daemon downloads a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullProgress {
    /// Human-readable status, e.g. `pulling manifest` or `success`.
    #[serde(default)]
    pub status: String,

    /// Layer digest currently being downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Bytes downloaded so far for the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,

    /// Total bytes of the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl PullProgress {
    /// Create a status-only event.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Create an event carrying byte counts.
    pub fn with_progress(status: impl Into<String>, completed: u64, total: u64) -> Self {
        Self {
            status: status.into(),
            digest: None,
            completed: Some(completed),
            total: Some(total),
        }
    }

    /// Whole-number percentage, rounded half up, when both counts are known.
    pub fn percent(&self) -> Option<u64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                let completed = completed as u128;
                let total = total as u128;
                Some(((completed * 100 + total / 2) / total) as u64)
            }
            _ => None,
        }
    }

    /// Status line shown while pulling: the status, then the percentage if known.
    pub fn status_text(&self) -> String {
        match self.percent() {
            Some(pct) => format!("{} {pct}%", self.status),
            None => self.status.clone(),
        }
    }
}
