// Shared HTTP client construction
// Both the checker and the downloader talk plain HTTP GET with fixed
// connect/read timeouts and no overall request deadline.

use std::time::Duration;

use crate::types::settings::UpdaterSettings;

const USER_AGENT: &str = concat!("autoupdate/", env!("CARGO_PKG_VERSION"));

/// Builds a client honoring the configured connect and per-read timeouts.
pub fn build_client(settings: &UpdaterSettings) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .read_timeout(Duration::from_secs(settings.read_timeout_secs));
    if !settings.use_system_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}
