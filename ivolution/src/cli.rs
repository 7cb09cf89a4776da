use anyhow::Result;
use clap::{Parser, Subcommand};
use ivolution_lib::config::Config;
use ivolution_lib::launcher::Launcher;
use ivolution_lib::platform::Platform;
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{
    check::CheckCommand, download::DownloadCommand, update::UpdateCommand,
    versions::VersionsCommand,
};

#[derive(Parser)]
#[command(name = "ivolution")]
#[command(about = "Check for and download the latest Ivolution release")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Read settings from this launcher.toml instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint describing the latest release
    #[arg(long, global = true)]
    pub metadata_url: Option<String>,

    /// Endpoint listing all published releases
    #[arg(long, global = true)]
    pub versions_url: Option<String>,

    /// Where downloaded builds are stored (defaults to ~/Ivolution)
    #[arg(long, global = true)]
    pub install_dir: Option<PathBuf>,

    /// Download the build for this platform instead of the current one (windows, mac)
    #[arg(long, global = true, value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Give up when the server sends nothing for this many seconds
    #[arg(long, global = true)]
    pub read_timeout: Option<u64>,

    /// Delete the partially downloaded file when a download fails or is cancelled
    #[arg(long, global = true)]
    pub cleanup_partial: bool,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest available version
    Check(CheckCommand),

    /// Download the latest version
    #[command(alias = "up")]
    Update(UpdateCommand),

    /// List all published versions
    #[command(alias = "ls")]
    Versions(VersionsCommand),

    /// Download a specific published version
    Download(DownloadCommand),
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse::<Platform>().map_err(|e| e.to_string())
}

impl GlobalArgs {
    /// The configuration file (if any) with command line flags on top.
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config.as_deref())?;
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(url) = &self.metadata_url {
            config.metadata_url = url.clone();
        }
        if let Some(url) = &self.versions_url {
            config.versions_url = url.clone();
        }
        if let Some(dir) = &self.install_dir {
            config.install_dir = dir.clone();
        }
        if let Some(secs) = self.read_timeout {
            config.read_timeout = Duration::from_secs(secs);
        }
        if self.cleanup_partial {
            config.cleanup_partial = true;
        }
        config
    }
}

impl Commands {
    pub async fn run(self, launcher: &Launcher) -> Result<()> {
        match self {
            Commands::Check(cmd) => cmd.run(launcher).await,
            Commands::Update(cmd) => cmd.run(launcher).await,
            Commands::Versions(cmd) => cmd.run(launcher).await,
            Commands::Download(cmd) => cmd.run(launcher).await,
        }
    }
}
