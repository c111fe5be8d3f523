//! Terminal-backed collaborators used by the demo binary.

use std::io::{self, BufRead, Write};

use crate::platform::{PackageInfoProvider, ProgressNotifier, UpdatePrompt};
use crate::types::download::Progress;

/// Package info with a build code fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct StaticPackageInfo {
    version_code: Option<i64>,
}

impl StaticPackageInfo {
    pub fn new(version_code: i64) -> Self {
        Self {
            version_code: Some(version_code),
        }
    }

    /// A provider that cannot resolve the installed package.
    pub fn unknown() -> Self {
        Self { version_code: None }
    }
}

impl PackageInfoProvider for StaticPackageInfo {
    fn installed_version_code(&self) -> Option<i64> {
        self.version_code
    }
}

/// Sends progress notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ProgressNotifier for LogNotifier {
    fn show_progress(&self, id: u32, title: &str, body: &str, progress: Progress) {
        match progress {
            Progress::Percent(p) => log::info!("[{}#{}] {} ({}/100)", title, id, body, p),
            Progress::Indeterminate { bytes_transferred } => {
                log::info!("[{}#{}] {} ({} bytes)", title, id, body, bytes_transferred)
            }
        }
    }

    fn cancel(&self, id: u32) {
        log::debug!("Progress notification {} cancelled", id);
    }
}

/// Asks the user on stdin/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl UpdatePrompt for ConsolePrompt {
    fn show_checking(&self) {
        eprintln!("Checking for a new version...");
    }

    fn dismiss_checking(&self) {}

    fn confirm_update(&self, notes: &str, url: &str) -> bool {
        eprintln!("A new version is available:\n\n{}\n", notes);
        eprint!("Download {} now? [y/N] ", url);
        let _ = io::stderr().flush();

        match read_answer() {
            Ok(answer) => is_affirmative(&answer),
            Err(e) => {
                log::warn!("Could not read answer: {}", e);
                false
            }
        }
    }

    fn show_no_update(&self) {
        eprintln!("You are running the latest version.");
    }
}

fn read_answer() -> io::Result<String> {
    run_blocking(|| {
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).map(|_| answer)
    })
}

/// Runs blocking terminal I/O. On a multi-thread runtime the worker hands its
/// other tasks off first so a running download keeps making progress.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
