//! Version Checker.
//!
//! Fetches the remote version manifest and decides whether the user should be
//! offered an update. Failures never surface: they are logged and read as
//! "no update available".

use std::sync::Arc;

use crate::platform::PackageInfoProvider;
use crate::services::http;
use crate::types::errors::UpdateError;
use crate::types::settings::UpdaterSettings;
use crate::types::update::{UpdateDecision, VersionManifest};

/// Parses a manifest body. All three fields must be present and well typed.
pub fn parse_manifest(body: &str) -> Result<VersionManifest, UpdateError> {
    serde_json::from_str(body).map_err(|e| UpdateError::ParseError(e.to_string()))
}

/// Offers an update iff the remote build code is strictly greater.
pub fn decide(manifest: &VersionManifest, local_version: i64) -> UpdateDecision {
    if manifest.version_code > local_version {
        UpdateDecision::Prompt {
            message: manifest.update_message.clone(),
            url: manifest.download_url.clone(),
        }
    } else {
        UpdateDecision::NoUpdate
    }
}

/// Checks a manifest endpoint against the installed build.
pub struct VersionChecker {
    client: reqwest::Client,
    manifest_url: String,
    package_info: Arc<dyn PackageInfoProvider>,
}

impl VersionChecker {
    pub fn new(
        settings: &UpdaterSettings,
        package_info: Arc<dyn PackageInfoProvider>,
    ) -> Result<Self, UpdateError> {
        let client = http::build_client(settings)
            .map_err(|e| UpdateError::NetworkError(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            client,
            manifest_url: settings.manifest_url.clone(),
            package_info,
        })
    }

    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Issues one GET to the manifest URL and parses the body.
    pub async fn fetch_manifest(&self) -> Result<VersionManifest, UpdateError> {
        let response = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| UpdateError::NetworkError(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::NetworkError(format!("Failed to read body: {}", e)))?;

        parse_manifest(&body)
    }

    /// Installed build code. An unresolvable package counts as build 0.
    pub fn local_version(&self) -> i64 {
        match self.package_info.installed_version_code() {
            Some(code) => code,
            None => {
                log::warn!("Installed package version unavailable, assuming 0");
                0
            }
        }
    }

    /// Fetches, parses and decides, surfacing fetch and parse errors.
    pub async fn try_check(&self) -> Result<UpdateDecision, UpdateError> {
        log::info!("Checking for updates at {}", self.manifest_url);
        let manifest = self.fetch_manifest().await?;

        let local = self.local_version();
        let decision = decide(&manifest, local);
        log::info!(
            "Remote version {} vs installed {}: {}",
            manifest.version_code,
            local,
            if decision.is_prompt() { "update available" } else { "up to date" }
        );
        Ok(decision)
    }

    /// Like `try_check`, but every failure reads as `NoUpdate`.
    pub async fn check(&self) -> UpdateDecision {
        self.try_check().await.unwrap_or_else(|e| {
            log::warn!("Update check failed: {}", e);
            UpdateDecision::NoUpdate
        })
    }
}
