// System opener for Linux
// Package files are handed to `xdg-open`, which routes them to the desktop's
// registered installer for the MIME type.

use std::path::Path;
use std::process::Command;

use crate::types::errors::InstallError;

fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Spawns `xdg-open <path>` without waiting for it.
pub fn open_package(path: &Path) -> Result<(), InstallError> {
    opener_command(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| InstallError::LaunchFailed(format!("xdg-open: {}", e)))
}
