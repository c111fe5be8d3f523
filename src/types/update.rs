use serde::{Deserialize, Serialize};

/// Remote descriptor advertising the latest available build.
///
/// Every field is required; a body missing any of them fails to deserialize
/// as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(rename = "url")]
    pub download_url: String,
    #[serde(rename = "versionCode")]
    pub version_code: i64,
    #[serde(rename = "updateMessage")]
    pub update_message: String,
}

/// Outcome of comparing a manifest against the installed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// A newer build exists; ask the user with these release notes.
    Prompt { message: String, url: String },
    NoUpdate,
}

impl UpdateDecision {
    pub fn is_prompt(&self) -> bool {
        matches!(self, UpdateDecision::Prompt { .. })
    }
}
