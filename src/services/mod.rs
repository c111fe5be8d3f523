// AutoUpdate services
// The version checker and update downloader, plus the helpers they share.

pub mod http;
pub mod release_notes;
pub mod update_downloader;
pub mod version_checker;
