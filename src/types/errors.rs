use thiserror::Error;

use crate::types::download::DownloadState;

// === UpdateError ===

/// Errors raised while fetching or parsing the version manifest.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Connection, timeout or HTTP-layer failure.
    #[error("Update network error: {0}")]
    NetworkError(String),
    /// The manifest body was not valid JSON or lacked a required field.
    #[error("Update parse error: {0}")]
    ParseError(String),
}

// === DownloadError ===

/// Errors raised while downloading or installing an update package.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The source URL has no usable file name.
    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),
    /// Connection, timeout or HTTP-layer failure.
    #[error("Download network error: {0}")]
    NetworkError(String),
    /// Writing the destination file failed.
    #[error("Download I/O error: {0}")]
    IoError(String),
    /// The OS installer could not be launched.
    #[error("Install error: {0}")]
    InstallError(String),
    /// The job was asked to move between two states that are not connected.
    #[error("Invalid download state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: DownloadState,
        to: DownloadState,
    },
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::IoError(e.to_string())
    }
}

impl From<InstallError> for DownloadError {
    fn from(e: InstallError) -> Self {
        DownloadError::InstallError(e.to_string())
    }
}

// === InstallError ===

/// Errors raised while handing a package to the OS installer.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Changing file permissions failed. Callers treat this as best-effort.
    #[error("Permission error: {0}")]
    PermissionError(String),
    /// The platform opener could not be started.
    #[error("Failed to launch installer: {0}")]
    LaunchFailed(String),
}
