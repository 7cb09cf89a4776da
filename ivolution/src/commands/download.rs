use crate::commands::progress::download_with_progress;
use crate::ui;
use anyhow::{Context, Result};
use clap::Args;
use ivolution_lib::launcher::Launcher;

#[derive(Args)]
pub struct DownloadCommand {
    /// The version to download, as shown by `ivolution versions`
    #[arg(value_name = "VERSION")]
    pub release: String,

    /// Download again even if this version is already on disk
    #[arg(long, short)]
    pub force: bool,
}

impl DownloadCommand {
    pub async fn run(self, launcher: &Launcher) -> Result<()> {
        let resolved = launcher
            .resolve_version(&self.release)
            .await
            .context(format!("Failed to find Ivolution {}", self.release))?;

        if !self.force && launcher.is_downloaded(&resolved) {
            ui::success(&format!(
                "Ivolution {} is already downloaded: {}",
                resolved.version,
                launcher.target_for(&resolved).destination.display()
            ));
            return Ok(());
        }

        let path = download_with_progress(launcher, &resolved)
            .await
            .context(format!("Failed to download Ivolution {}", resolved.version))?;

        ui::success(&format!(
            "Ivolution {} downloaded to: {}",
            resolved.version,
            path.display()
        ));
        Ok(())
    }
}
