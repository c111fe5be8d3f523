use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::errors::DownloadError;

/// Lifecycle of a single download job.
///
/// `Installing` and `Failed` are terminal. A retry needs a fresh job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Installing,
    Failed(String),
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadState::Installing | DownloadState::Failed(_))
    }

    fn can_move_to(&self, next: &DownloadState) -> bool {
        use DownloadState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Streaming)
                | (Streaming, Completed)
                | (Completed, Installing)
                | (Connecting, Failed(_))
                | (Streaming, Failed(_))
                | (Completed, Failed(_))
        )
    }
}

/// A progress value handed to the notification surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Whole percent in `0..=100`.
    Percent(u8),
    /// The server did not declare a content length.
    Indeterminate { bytes_transferred: u64 },
}

/// Mutable state tracking one artifact download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub id: String,
    pub source_url: String,
    pub destination_path: PathBuf,
    pub total_bytes: Option<u64>,
    pub bytes_transferred: u64,
    pub last_reported_percent: u8,
    pub state: DownloadState,
}

impl DownloadJob {
    pub fn new(source_url: &str, destination_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_url: source_url.to_string(),
            destination_path,
            total_bytes: None,
            bytes_transferred: 0,
            last_reported_percent: 0,
            state: DownloadState::Idle,
        }
    }

    /// Moves the job to `next`, rejecting edges the lifecycle does not allow.
    pub fn transition(&mut self, next: DownloadState) -> Result<(), DownloadError> {
        if !self.state.can_move_to(&next) {
            return Err(DownloadError::InvalidTransition {
                from: self.state.clone(),
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Records the declared content length. Zero counts as unknown.
    pub fn set_total_bytes(&mut self, total: Option<u64>) {
        self.total_bytes = total.filter(|t| *t > 0);
    }

    /// Progress to show before the first chunk arrives, if any.
    pub fn initial_progress(&self) -> Option<Progress> {
        match self.total_bytes {
            None => Some(Progress::Indeterminate {
                bytes_transferred: self.bytes_transferred,
            }),
            Some(_) => None,
        }
    }

    /// Accounts for `len` freshly written bytes.
    ///
    /// Returns a progress update only when the whole percent strictly
    /// increases over the last reported value.
    pub fn record_chunk(&mut self, len: usize) -> Option<Progress> {
        self.bytes_transferred = self.bytes_transferred.saturating_add(len as u64);
        let total = self.total_bytes?;

        let percent = percent_of(self.bytes_transferred, total);
        if percent > self.last_reported_percent {
            self.last_reported_percent = percent;
            Some(Progress::Percent(percent))
        } else {
            None
        }
    }
}

/// `floor(done * 100 / total)`, clamped to 100.
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done as u128 * 100) / total as u128;
    pct.min(100) as u8
}
