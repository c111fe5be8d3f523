// System opener for Windows
// `start` resolves the registered handler; the empty string is the window title.

use std::path::Path;
use std::process::Command;

use crate::types::errors::InstallError;

fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

/// Spawns `cmd /C start "" <path>` without waiting for it.
pub fn open_package(path: &Path) -> Result<(), InstallError> {
    opener_command(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| InstallError::LaunchFailed(format!("cmd start: {}", e)))
}
