pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod launcher;
pub mod logging;
pub mod metadata;
pub mod metadata_source;
pub mod platform;
pub mod progress;

#[cfg(test)]
pub mod test_helpers;
