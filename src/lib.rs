//! AutoUpdate: checks a remote manifest for a newer build, downloads it and
//! hands it to the OS installer.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod platform;
pub mod services;
pub mod types;
