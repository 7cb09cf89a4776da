use crate::commands::progress::download_with_progress;
use crate::ui;
use anyhow::{Context, Result};
use clap::Args;
use ivolution_lib::launcher::Launcher;

#[derive(Args)]
pub struct UpdateCommand {
    /// Download again even if this version is already on disk
    #[arg(long, short)]
    pub force: bool,
}

impl UpdateCommand {
    pub async fn run(self, launcher: &Launcher) -> Result<()> {
        ui::info("Checking for the latest Ivolution release...");

        let resolved = launcher
            .check()
            .await
            .context("Failed to check for updates")?;
        ui::info(&format!("Latest version: {}", resolved.version));

        if !self.force && launcher.is_downloaded(&resolved) {
            let target = launcher.target_for(&resolved);
            ui::success(&format!(
                "Ivolution {} is already downloaded: {}",
                resolved.version,
                target.destination.display()
            ));
            ui::tip("Use `ivolution update --force` to download it again.");
            return Ok(());
        }

        let path = download_with_progress(launcher, &resolved)
            .await
            .context(format!("Failed to download Ivolution {}", resolved.version))?;

        ui::success(&format!("Ivolution has been downloaded to: {}", path.display()));
        Ok(())
    }
}
