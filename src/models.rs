//! Data models and structures used throughout the application

use serde::{Deserialize, Serialize};

/// Pipeline stage of a submission, as shown in the conversation view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Optimizing,
    Generating,
    Resolved,
    Failed,
}

impl SubmissionStatus {
    /// Resolved and failed submissions are immutable
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

/// One user request cycle, from typed prompt to rendered outcome
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: u64,
    pub timestamp: String,
    pub prompt: String,
    pub enhanced_prompt: Option<String>,
    pub status: SubmissionStatus,
    pub image_url: Option<String>,
    pub error: Option<String>,
}

impl Submission {
    /// Creates a fresh submission for a trimmed, non-empty prompt
    pub fn new(id: u64, prompt: &str) -> Self {
        Self {
            id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            prompt: prompt.to_string(),
            enhanced_prompt: None,
            status: SubmissionStatus::Submitted,
            image_url: None,
            error: None,
        }
    }
}

/// Settings exposed to the front-end (the API key is fetched separately)
#[derive(Debug, Clone, Serialize)]
pub struct UiSettings {
    pub auto_download: bool,
}
