//! Update Downloader.
//!
//! Streams a confirmed update package into the cache directory, reporting
//! whole-percent progress, then hands the file to the OS installer. Runs as a
//! detached tokio task; once started it stops only on success or error.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{pin_mut, Stream, StreamExt};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::task::JoinHandle;

use crate::platform::{self, PackageInstaller, ProgressNotifier};
use crate::services::http;
use crate::types::download::{DownloadJob, DownloadState, Progress};
use crate::types::errors::DownloadError;
use crate::types::settings::UpdaterSettings;

/// Last non-empty path segment of `url`, ignoring query and fragment.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn progress_body(progress: Progress) -> String {
    match progress {
        Progress::Percent(p) => format!("Downloading: {}%", p),
        Progress::Indeterminate { .. } => "Downloading...".to_string(),
    }
}

/// Downloads update packages and launches the installer on completion.
pub struct UpdateDownloader {
    client: reqwest::Client,
    settings: UpdaterSettings,
    notifier: Arc<dyn ProgressNotifier>,
    installer: Arc<dyn PackageInstaller>,
}

impl UpdateDownloader {
    pub fn new(
        settings: UpdaterSettings,
        notifier: Arc<dyn ProgressNotifier>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Result<Self, DownloadError> {
        let client = http::build_client(&settings)
            .map_err(|e| DownloadError::NetworkError(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            client,
            settings,
            notifier,
            installer,
        })
    }

    pub fn settings(&self) -> &UpdaterSettings {
        &self.settings
    }

    /// Where the package behind `url` lands inside the cache directory.
    pub fn destination_for(&self, url: &str) -> Result<PathBuf, DownloadError> {
        file_name_from_url(url)
            .map(|name| self.settings.cache_dir.join(name))
            .ok_or_else(|| DownloadError::InvalidUrl(url.to_string()))
    }

    /// Starts `download` on the runtime without tying it to the caller.
    ///
    /// Dropping the returned handle does not stop the download.
    pub fn spawn(self: &Arc<Self>, url: String) -> JoinHandle<Result<DownloadJob, DownloadError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.download(&url).await })
    }

    /// Runs one job from connect to installer dispatch.
    ///
    /// On failure the job ends in `Failed`, the partial file stays on disk,
    /// the progress notification is cancelled and the installer is not run.
    pub async fn download(&self, url: &str) -> Result<DownloadJob, DownloadError> {
        let destination = self.destination_for(url).inspect_err(|e| {
            log::error!("Download aborted: {}", e);
        })?;
        let mut job = DownloadJob::new(url, destination);
        log::info!(
            "Download {} started: {} -> {}",
            job.id,
            url,
            job.destination_path.display()
        );

        match self.run(&mut job).await {
            Ok(()) => Ok(job),
            Err(e) => {
                let _ = job.transition(DownloadState::Failed(e.to_string()));
                self.notifier.cancel(self.settings.notification_id);
                log::error!("Download {} failed after {} bytes: {}", job.id, job.bytes_transferred, e);
                Err(e)
            }
        }
    }

    async fn run(&self, job: &mut DownloadJob) -> Result<(), DownloadError> {
        job.transition(DownloadState::Connecting)?;

        let response = self
            .client
            .get(&job.source_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        job.set_total_bytes(response.content_length());
        self.write_stream(job, response.bytes_stream()).await?;

        job.transition(DownloadState::Completed)?;
        self.notifier.cancel(self.settings.notification_id);
        log::info!(
            "Download {} complete: {} bytes",
            job.id,
            job.bytes_transferred
        );

        self.install_package(&job.destination_path)?;
        job.transition(DownloadState::Installing)
    }

    /// Writes `chunks` into the job's destination file, emitting progress.
    ///
    /// The job must be `Connecting` with its total already recorded; it is
    /// left in `Streaming` once the stream ends cleanly.
    pub async fn write_stream<S, B, E>(
        &self,
        job: &mut DownloadJob,
        chunks: S,
    ) -> Result<(), DownloadError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        if let Some(parent) = job.destination_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = fs::File::create(&job.destination_path).await?;
        let mut out = BufWriter::with_capacity(self.settings.chunk_size, file);
        job.transition(DownloadState::Streaming)?;

        if let Some(progress) = job.initial_progress() {
            self.emit(progress);
        }

        pin_mut!(chunks);
        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    // Keep what arrived so far on disk.
                    let _ = out.flush().await;
                    return Err(DownloadError::NetworkError(e.to_string()));
                }
            };
            let bytes = chunk.as_ref();
            out.write_all(bytes).await?;
            if let Some(progress) = job.record_chunk(bytes.len()) {
                self.emit(progress);
            }
        }

        out.flush().await?;
        out.into_inner().sync_all().await?;
        Ok(())
    }

    /// Makes the package readable by the installer (best-effort) and asks the
    /// OS to install it. The install outcome is not observed.
    pub fn install_package(&self, file: &Path) -> Result<(), DownloadError> {
        if let Err(e) = platform::make_world_readable(file) {
            log::debug!("Ignoring permission failure: {}", e);
        }
        self.installer
            .install(file, &self.settings.package_mime_type)
            .inspect_err(|e| log::error!("Installer launch failed: {}", e))?;
        Ok(())
    }

    fn emit(&self, progress: Progress) {
        log::debug!("Download progress: {:?}", progress);
        self.notifier.show_progress(
            self.settings.notification_id,
            &self.settings.app_name,
            &progress_body(progress),
            progress,
        );
    }
}
