// Host platform collaborators
// The update logic never reaches for OS services directly; it talks to these
// traits, which hosts implement (or tests fake).
//
// Uses `cfg(target_os)` to pick the system opener used by `SystemInstaller`.

use std::path::{Path, PathBuf};

use crate::types::download::Progress;
use crate::types::errors::InstallError;

pub mod console;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

pub use console::{ConsolePrompt, LogNotifier, StaticPackageInfo};

/// Read-only access to the installed package's metadata.
pub trait PackageInfoProvider: Send + Sync {
    /// Integer build code of the running application, or `None` when the
    /// package cannot be resolved.
    fn installed_version_code(&self) -> Option<i64>;
}

/// Notification surface used to show download progress.
pub trait ProgressNotifier: Send + Sync {
    fn show_progress(&self, id: u32, title: &str, body: &str, progress: Progress);
    fn cancel(&self, id: u32);
}

/// Hands a local package file to the OS installer. The install result is
/// never reported back.
pub trait PackageInstaller: Send + Sync {
    fn install(&self, path: &Path, mime_type: &str) -> Result<(), InstallError>;
}

/// Interactive surface for the update check.
pub trait UpdatePrompt: Send + Sync {
    /// Show a transient "checking for updates" indicator.
    fn show_checking(&self);
    fn dismiss_checking(&self);
    /// Ask whether to download `url`. `notes` is already rendered to text.
    fn confirm_update(&self, notes: &str, url: &str) -> bool;
    /// Tell the user the installed build is current.
    fn show_no_update(&self);
}

/// Opens downloaded packages with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInstaller;

impl PackageInstaller for SystemInstaller {
    fn install(&self, path: &Path, mime_type: &str) -> Result<(), InstallError> {
        log::info!("Opening {} ({}) with the system installer", path.display(), mime_type);
        open_with_system_handler(path)
    }
}

fn open_with_system_handler(path: &Path) -> Result<(), InstallError> {
    #[cfg(target_os = "linux")]
    {
        linux::open_package(path)
    }
    #[cfg(target_os = "macos")]
    {
        macos::open_package(path)
    }
    #[cfg(target_os = "windows")]
    {
        windows::open_package(path)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Err(InstallError::LaunchFailed(format!(
            "no system opener for {}",
            path.display()
        )))
    }
}

/// Sets `rwxrwxrwx` on the downloaded file so the installer process can read it.
pub fn make_world_readable(path: &Path) -> Result<(), InstallError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
            .map_err(|e| InstallError::PermissionError(format!("{}: {}", path.display(), e)))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}

/// Returns the application-private directory where update packages are stored.
///
/// Falls back to the system temp dir when the platform has no cache dir.
pub fn get_update_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("autoupdate")
        .join("updates")
}
