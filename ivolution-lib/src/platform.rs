use crate::error::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platforms the update metadata publishes builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Mac,
}

impl Platform {
    /// Map an OS string as reported by `std::env::consts::OS` to a platform.
    ///
    /// Only operating systems with a published build are accepted; anything
    /// else is an error rather than a guess.
    pub fn from_os(os: &str) -> Result<Self, UpdateError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::Mac),
            other => Err(UpdateError::UnsupportedPlatform(format!(
                "no Ivolution build is published for '{other}'"
            ))),
        }
    }

    pub fn current() -> Result<Self, UpdateError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Key used in the metadata `platforms` map.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "mac",
        }
    }

    /// Extension of the downloaded artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Platform::Windows => "exe",
            Platform::Mac => "app",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "mac" | "macos" | "osx" => Ok(Platform::Mac),
            other => Err(UpdateError::UnsupportedPlatform(format!(
                "unknown platform key '{other}'"
            ))),
        }
    }
}
