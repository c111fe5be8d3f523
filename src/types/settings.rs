use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform;

/// Manifest endpoint queried when no other URL is configured.
pub const DEFAULT_MANIFEST_URL: &str =
    "http://crazyfzw.github.io/demo/auto-update-version/update.json";

/// MIME type passed to the installer for downloaded packages.
pub const PACKAGE_MIME_TYPE: &str = "application/vnd.android.package-archive";

/// Tunables for the checker and downloader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterSettings {
    pub manifest_url: String,
    /// Title used on the progress notification.
    pub app_name: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Write buffer size for the destination file, in bytes.
    pub chunk_size: usize,
    pub cache_dir: PathBuf,
    pub notification_id: u32,
    pub package_mime_type: String,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment. Off unless a
    /// host opts in.
    pub use_system_proxy: bool,
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            app_name: "AutoUpdate".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            chunk_size: 10 * 1024,
            cache_dir: platform::get_update_cache_dir(),
            notification_id: 0,
            package_mime_type: PACKAGE_MIME_TYPE.to_string(),
            use_system_proxy: false,
        }
    }
}

impl UpdaterSettings {
    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_timeouts(mut self, connect_secs: u64, read_secs: u64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.read_timeout_secs = read_secs;
        self
    }

    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }
}
