//! Update flow.
//!
//! Ties the checker, the user prompt and the downloader together: what a host
//! runs when the user asks to check for updates.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::platform::{PackageInfoProvider, PackageInstaller, ProgressNotifier, UpdatePrompt};
use crate::services::release_notes;
use crate::services::update_downloader::UpdateDownloader;
use crate::services::version_checker::VersionChecker;
use crate::types::download::DownloadJob;
use crate::types::errors::DownloadError;
use crate::types::settings::UpdaterSettings;
use crate::types::update::UpdateDecision;

/// What one run of the flow ended with.
#[derive(Debug)]
pub enum FlowOutcome {
    /// Installed build is current, or the check failed.
    NoUpdate,
    /// The user declined the offered update.
    Dismissed,
    /// A download was started in the background.
    DownloadStarted(JoinHandle<Result<DownloadJob, DownloadError>>),
}

/// Checker → prompt → downloader, with collaborators injected.
pub struct UpdateFlow {
    checker: VersionChecker,
    downloader: Arc<UpdateDownloader>,
    prompt: Arc<dyn UpdatePrompt>,
}

impl UpdateFlow {
    pub fn new(checker: VersionChecker, downloader: UpdateDownloader, prompt: Arc<dyn UpdatePrompt>) -> Self {
        Self {
            checker,
            downloader: Arc::new(downloader),
            prompt,
        }
    }

    /// Builds the checker and downloader from one settings value.
    pub fn from_settings(
        settings: UpdaterSettings,
        package_info: Arc<dyn PackageInfoProvider>,
        prompt: Arc<dyn UpdatePrompt>,
        notifier: Arc<dyn ProgressNotifier>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let checker = VersionChecker::new(&settings, package_info)?;
        let downloader = UpdateDownloader::new(settings, notifier, installer)?;
        Ok(Self::new(checker, downloader, prompt))
    }

    pub fn checker(&self) -> &VersionChecker {
        &self.checker
    }

    pub fn downloader(&self) -> &Arc<UpdateDownloader> {
        &self.downloader
    }

    /// Runs one check.
    ///
    /// `interactive` checks show the "checking" indicator and report when the
    /// installed build is current; silent checks only speak up when there is
    /// an update to offer. A failed check is logged and shows nothing.
    pub async fn run(&self, interactive: bool) -> FlowOutcome {
        if interactive {
            self.prompt.show_checking();
        }
        let result = self.checker.try_check().await;
        if interactive {
            self.prompt.dismiss_checking();
        }

        let decision = match result {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("Update check failed: {}", e);
                return FlowOutcome::NoUpdate;
            }
        };

        match decision {
            UpdateDecision::NoUpdate => {
                if interactive {
                    self.prompt.show_no_update();
                }
                FlowOutcome::NoUpdate
            }
            UpdateDecision::Prompt { message, url } => {
                let notes = release_notes::render(&message);
                if self.prompt.confirm_update(&notes, &url) {
                    log::info!("Update confirmed, downloading {}", url);
                    FlowOutcome::DownloadStarted(self.downloader.spawn(url))
                } else {
                    log::info!("Update dismissed");
                    FlowOutcome::Dismissed
                }
            }
        }
    }
}
