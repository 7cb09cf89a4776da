use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can end a metadata check or a download.
///
/// Variants carry rendered messages instead of source errors so the value can
/// be cloned into download events and compared in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid update metadata: {0}")]
    Parse(String),

    #[error("No download is published for platform '{0}'")]
    MissingPlatformEntry(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Filesystem error at {}: {message}", path.display())]
    Filesystem { path: PathBuf, message: String },

    #[error("Version {0} is not in the version index")]
    UnknownVersion(String),

    #[error("A download is already in progress")]
    DownloadInProgress,
}

/// Fieldless mirror of [UpdateError] for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    HttpStatus,
    Parse,
    MissingPlatformEntry,
    UnsupportedPlatform,
    Filesystem,
    UnknownVersion,
    DownloadInProgress,
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::Network(_) => ErrorKind::Network,
            UpdateError::HttpStatus { .. } => ErrorKind::HttpStatus,
            UpdateError::Parse(_) => ErrorKind::Parse,
            UpdateError::MissingPlatformEntry(_) => ErrorKind::MissingPlatformEntry,
            UpdateError::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            UpdateError::Filesystem { .. } => ErrorKind::Filesystem,
            UpdateError::UnknownVersion(_) => ErrorKind::UnknownVersion,
            UpdateError::DownloadInProgress => ErrorKind::DownloadInProgress,
        }
    }

    pub(crate) fn filesystem(path: &Path, err: std::io::Error) -> Self {
        UpdateError::Filesystem {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return UpdateError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        // Body read failures surface as "error decoding response body", so the
        // cause (reset, timed out, dns) has to come from the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        UpdateError::Network(message)
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        UpdateError::Parse(err.to_string())
    }
}
