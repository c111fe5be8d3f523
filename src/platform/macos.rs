// System opener for macOS
// `open` hands the file to whichever application claims its type.

use std::path::Path;
use std::process::Command;

use crate::types::errors::InstallError;

fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

/// Spawns `open <path>` without waiting for it.
pub fn open_package(path: &Path) -> Result<(), InstallError> {
    opener_command(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| InstallError::LaunchFailed(format!("open: {}", e)))
}
