//! Error types for the host-services port (§6.1).
//!
//! The core itself is total (§7): a malformed escape sequence is logged and
//! discarded, never surfaced as a `Result`. The only fallible operations
//! are the ones that call out to the host (settings, clipboard).

use std::fmt;

/// An error returned by a [`crate::ports::HostServices`] implementation.
#[derive(Debug)]
pub enum HostServiceError {
    /// The host has no clipboard contents, or the clipboard is unavailable.
    ClipboardUnavailable,
    /// The requested settings key does not exist or could not be read.
    SettingsUnavailable(String),
    /// The host's config path could not be resolved.
    ConfigPathUnavailable(String),
}

impl fmt::Display for HostServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostServiceError::ClipboardUnavailable => write!(f, "clipboard unavailable"),
            HostServiceError::SettingsUnavailable(key) => {
                write!(f, "settings value unavailable: {key}")
            }
            HostServiceError::ConfigPathUnavailable(msg) => {
                write!(f, "config path unavailable: {msg}")
            }
        }
    }
}

impl std::error::Error for HostServiceError {}
