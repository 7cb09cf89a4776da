use crate::error::UpdateError;
use crate::metadata_source::MetadataSource;
use crate::platform::Platform;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Matches the `latest-metadata.json` document
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UpdateMetadata {
    pub version: String,
    pub platforms: HashMap<String, String>,
}

/// Matches the `versions/index.json` document
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionIndex {
    pub versions: Vec<VersionEntry>,
}

/// A single published release from the version catalogue.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: String,
    #[serde(deserialize_with = "deserialize_release_date")]
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Per-platform builds, keyed like `latest-metadata.json`.
    #[serde(default)]
    pub platforms: HashMap<String, String>,
    /// Older catalogues publish a single Windows installer here.
    #[serde(default, rename = "downloadUrl")]
    pub download_url: Option<String>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Requirements {
    pub minimal: HardwareSpec,
    pub recommended: HardwareSpec,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HardwareSpec {
    pub ram: String,
    pub cpu: String,
    pub gpu: String,
}

/// The build chosen for this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpdate {
    pub version: String,
    pub platform: Platform,
    pub download_url: String,
    pub local_filename: String,
}

/// What the downloader fetches and where it puts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub destination: PathBuf,
    /// Used for progress when the server does not send `Content-Length`.
    /// Only an estimate: the stream decides when the download is complete.
    pub expected_size: Option<u64>,
}

impl DownloadTarget {
    /// Where bytes land until the transfer completes, `<destination>.part`.
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self
            .destination
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".part");
        self.destination.with_file_name(name)
    }
}

impl ResolvedUpdate {
    fn new(version: &str, platform: Platform, download_url: &str) -> Result<Self, UpdateError> {
        validate_version(version)?;
        Ok(Self {
            version: version.to_string(),
            platform,
            download_url: download_url.to_string(),
            local_filename: local_filename(version, platform),
        })
    }

    pub fn into_target(self, install_dir: &Path) -> DownloadTarget {
        DownloadTarget {
            url: self.download_url,
            destination: install_dir.join(self.local_filename),
            expected_size: None,
        }
    }
}

impl UpdateMetadata {
    /// Pick the download published for `platform`.
    pub fn resolve_for(&self, platform: Platform) -> Result<ResolvedUpdate, UpdateError> {
        let url = self
            .platforms
            .get(platform.key())
            .ok_or_else(|| UpdateError::MissingPlatformEntry(platform.key().to_string()))?;
        ResolvedUpdate::new(&self.version, platform, url)
    }
}

impl VersionEntry {
    /// The build published for `platform`. A bare `downloadUrl` only counts
    /// as the Windows build.
    pub fn resolve_for(&self, platform: Platform) -> Result<ResolvedUpdate, UpdateError> {
        let url = self
            .platforms
            .get(platform.key())
            .or(match platform {
                Platform::Windows => self.download_url.as_ref(),
                Platform::Mac => None,
            })
            .ok_or_else(|| UpdateError::MissingPlatformEntry(platform.key().to_string()))?;
        ResolvedUpdate::new(&self.version, platform, url)
    }
}

/// `ivolution_v<version>.<ext>`
pub fn local_filename(version: &str, platform: Platform) -> String {
    format!("ivolution_v{}.{}", version, platform.extension())
}

/// The version ends up in a file name, so it must not be able to leave the
/// install directory.
fn validate_version(version: &str) -> Result<(), UpdateError> {
    if version.trim().is_empty() {
        return Err(UpdateError::Parse("'version' is empty".to_string()));
    }
    if version.contains('/') || version.contains('\\') || version.contains("..") {
        return Err(UpdateError::Parse(format!(
            "'version' contains path characters: {version}"
        )));
    }
    Ok(())
}

fn deserialize_release_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_release_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid release_date '{raw}'")))
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// Turns a metadata endpoint into a concrete build for the host platform.
///
/// Every call goes back to the source; nothing is cached and nothing is retried.
pub struct MetadataResolver<S> {
    source: S,
    os: String,
    platform_override: Option<Platform>,
}

impl<S: MetadataSource> MetadataResolver<S> {
    pub fn new(source: S, os: &str) -> Self {
        Self {
            source,
            os: os.to_string(),
            platform_override: None,
        }
    }

    /// Resolve for `platform` regardless of the host OS.
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform_override = platform;
        self
    }

    pub fn platform(&self) -> Result<Platform, UpdateError> {
        match self.platform_override {
            Some(platform) => Ok(platform),
            None => Platform::from_os(&self.os),
        }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, metadata_url: &str) -> Result<ResolvedUpdate, UpdateError> {
        let platform = self.platform()?;
        let metadata = self.source.fetch_metadata(metadata_url).await?;
        tracing::debug!(
            version = %metadata.version,
            platforms = metadata.platforms.len(),
            "Fetched update metadata"
        );
        metadata.resolve_for(platform)
    }

    /// All published versions, newest release first.
    #[instrument(skip(self))]
    pub async fn versions(&self, index_url: &str) -> Result<Vec<VersionEntry>, UpdateError> {
        let mut versions = self.source.fetch_versions(index_url).await?;
        versions.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        Ok(versions)
    }

    /// Find `version` in the catalogue and resolve it for this host.
    pub async fn resolve_version(
        &self,
        index_url: &str,
        version: &str,
    ) -> Result<ResolvedUpdate, UpdateError> {
        let platform = self.platform()?;
        let versions = self.versions(index_url).await?;
        let entry = versions
            .iter()
            .find(|entry| entry.version == version)
            .ok_or_else(|| UpdateError::UnknownVersion(version.to_string()))?;
        entry.resolve_for(platform)
    }
}
