use crate::ui;
use anyhow::{Context, Result};
use clap::Args;
use ivolution_lib::launcher::Launcher;

#[derive(Args)]
pub struct CheckCommand;

impl CheckCommand {
    pub async fn run(self, launcher: &Launcher) -> Result<()> {
        ui::info("Checking for the latest Ivolution release...");

        let resolved = launcher
            .check()
            .await
            .context("Failed to check for updates")?;
        let target = launcher.target_for(&resolved);

        ui::success(&format!("Latest version: {}", resolved.version));
        ui::info(&format!("Platform: {}", resolved.platform));
        ui::info(&format!("Download: {}", resolved.download_url));
        ui::info(&format!("Destination: {}", target.destination.display()));

        tracing::info!("");
        if launcher.is_downloaded(&resolved) {
            ui::success("This version is already downloaded.");
        } else {
            ui::tip("Run `ivolution update` to download it.");
        }

        Ok(())
    }
}
