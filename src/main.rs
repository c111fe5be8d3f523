//! AutoUpdate demo entry point.
//!
//! Runs one interactive update check against the default manifest, as if the
//! user had pressed "check for updates", and waits for any download it starts.

use std::sync::Arc;

use autoupdate::app::{FlowOutcome, UpdateFlow};
use autoupdate::platform::{ConsolePrompt, LogNotifier, StaticPackageInfo, SystemInstaller};
use autoupdate::types::settings::UpdaterSettings;

/// Build code of this binary.
const VERSION_CODE: i64 = 1;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = UpdaterSettings::default();
    let flow = match UpdateFlow::from_settings(
        settings,
        Arc::new(StaticPackageInfo::new(VERSION_CODE)),
        Arc::new(ConsolePrompt),
        Arc::new(LogNotifier),
        Arc::new(SystemInstaller),
    ) {
        Ok(flow) => flow,
        Err(e) => {
            log::error!("Failed to initialize updater: {}", e);
            return;
        }
    };

    if let FlowOutcome::DownloadStarted(handle) = flow.run(true).await {
        match handle.await {
            Ok(Ok(job)) => log::info!("Handed {} to the installer", job.destination_path.display()),
            Ok(Err(_)) => {}
            Err(e) => log::error!("Download task panicked: {}", e),
        }
    }
}
