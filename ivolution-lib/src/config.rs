use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_METADATA_URL: &str =
    "https://storage.googleapis.com/ivolution-releases/latest-metadata.json";
pub const DEFAULT_VERSIONS_URL: &str =
    "https://storage.googleapis.com/ivolution-releases/versions/index.json";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory downloaded builds are written to
    pub install_dir: PathBuf,

    /// Endpoint describing the latest release
    pub metadata_url: String,

    /// Endpoint listing every published release
    pub versions_url: String,

    /// Operating system string used to pick the platform build.
    pub os: String,

    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,

    /// Maximum time a single read may stall. Resets whenever bytes arrive.
    pub read_timeout: Duration,

    /// Remove the partially written file when a download fails or is cancelled.
    pub cleanup_partial: bool,

    pub user_agent: String,
}

/// On-disk `launcher.toml`. Every key is optional and falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    pub install_dir: Option<PathBuf>,
    pub metadata_url: Option<String>,
    pub versions_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub cleanup_partial: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new_for_path(&Self::default_install_dir())
    }
}

impl Config {
    pub fn new_for_path(install_dir: &Path) -> Self {
        Self {
            install_dir: install_dir.to_path_buf(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            versions_url: DEFAULT_VERSIONS_URL.to_string(),
            os: std::env::consts::OS.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            cleanup_partial: false,
            user_agent: format!("ivolution-launcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Loads the configuration, layering a TOML file over the defaults.
    ///
    /// An explicit `path` must exist. Without one, the default location
    /// (see [Self::default_config_file]) is read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_file().filter(|p| p.exists()),
        };

        let mut config = Self::default();
        if let Some(file) = file {
            let content = std::fs::read_to_string(&file)
                .context(format!("Failed to read config file: {}", file.display()))?;
            let toml = toml::from_str::<ConfigToml>(&content)
                .context(format!("Failed to parse config file: {}", file.display()))?;
            tracing::debug!("Loaded configuration from {}", file.display());
            config.apply(toml);
        }

        Ok(config)
    }

    fn apply(&mut self, toml: ConfigToml) {
        if let Some(install_dir) = toml.install_dir {
            self.install_dir = install_dir;
        }
        if let Some(url) = toml.metadata_url {
            self.metadata_url = url;
        }
        if let Some(url) = toml.versions_url {
            self.versions_url = url;
        }
        if let Some(secs) = toml.connect_timeout_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = toml.read_timeout_secs {
            self.read_timeout = Duration::from_secs(secs);
        }
        if let Some(cleanup) = toml.cleanup_partial {
            self.cleanup_partial = cleanup;
        }
    }

    pub fn default_install_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join("Ivolution")
    }

    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ivolution").join("launcher.toml"))
    }
}
