use crate::config::Config;
use crate::downloader::{DownloadSession, Downloader};
use crate::error::UpdateError;
use crate::http::HttpClient;
use crate::metadata::{DownloadTarget, MetadataResolver, ResolvedUpdate, VersionEntry};
use crate::platform::Platform;

/// Wires the resolver and the downloader together around one HTTP client.
///
/// Built once by the front end at startup and passed around from there.
pub struct Launcher {
    config: Config,
    resolver: MetadataResolver<HttpClient>,
    downloader: Downloader,
}

impl Launcher {
    /// `platform` overrides detection from `config.os`.
    pub fn new(config: Config, platform: Option<Platform>) -> Result<Self, UpdateError> {
        let client = HttpClient::new(&config)?;
        let resolver = MetadataResolver::new(client.clone(), &config.os).with_platform(platform);
        let downloader = Downloader::new(client, config.cleanup_partial);
        Ok(Self {
            config,
            resolver,
            downloader,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> Result<Platform, UpdateError> {
        self.resolver.platform()
    }

    /// The latest release for this host.
    pub async fn check(&self) -> Result<ResolvedUpdate, UpdateError> {
        self.resolver.resolve(&self.config.metadata_url).await
    }

    pub async fn versions(&self) -> Result<Vec<VersionEntry>, UpdateError> {
        self.resolver.versions(&self.config.versions_url).await
    }

    pub async fn resolve_version(&self, version: &str) -> Result<ResolvedUpdate, UpdateError> {
        self.resolver
            .resolve_version(&self.config.versions_url, version)
            .await
    }

    pub fn target_for(&self, resolved: &ResolvedUpdate) -> DownloadTarget {
        resolved.clone().into_target(&self.config.install_dir)
    }

    /// Whether this build already sits in the install directory. Interrupted
    /// downloads only ever leave a `.part` file, which does not count.
    pub fn is_downloaded(&self, resolved: &ResolvedUpdate) -> bool {
        self.target_for(resolved).destination.is_file()
    }

    pub fn start_download(
        &self,
        resolved: &ResolvedUpdate,
    ) -> Result<DownloadSession, UpdateError> {
        let target = self.target_for(resolved);
        tracing::debug!(
            "Downloading {} {} to {}",
            resolved.version,
            resolved.platform,
            target.destination.display()
        );
        self.downloader.start(target)
    }
}
