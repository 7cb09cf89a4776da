use crate::ui;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use ivolution_lib::launcher::Launcher;
use ivolution_lib::metadata::VersionEntry;
use ivolution_lib::platform::Platform;

#[derive(Args)]
pub struct VersionsCommand {
    /// Also show features and hardware requirements
    #[arg(long, short)]
    pub details: bool,
}

impl VersionsCommand {
    pub async fn run(self, launcher: &Launcher) -> Result<()> {
        let versions = launcher
            .versions()
            .await
            .context("Failed to fetch the version list")?;

        if versions.is_empty() {
            ui::warning("No versions have been published yet.");
            return Ok(());
        }

        // Without a supported platform we can still list, just not mark downloads.
        let platform = launcher.platform().ok();

        ui::info(&format!("{}", "Published versions:".cyan()));
        for (i, entry) in versions.iter().enumerate() {
            let downloaded = platform.is_some_and(|p| Self::is_downloaded(launcher, entry, p));
            Self::print_entry(entry, i == 0, downloaded, self.details);
        }

        tracing::info!("");
        ui::tip("Use `ivolution download <version>` to download a specific version.");
        Ok(())
    }

    fn is_downloaded(launcher: &Launcher, entry: &VersionEntry, platform: Platform) -> bool {
        entry
            .resolve_for(platform)
            .is_ok_and(|resolved| launcher.is_downloaded(&resolved))
    }

    fn print_entry(entry: &VersionEntry, latest: bool, downloaded: bool, details: bool) {
        let mut line = format!(
            "  {} {}",
            entry.version.bold(),
            entry.release_date.format("%Y-%m-%d").to_string().dimmed()
        );
        if latest {
            line.push_str(&format!(" {}", "(latest)".green()));
        }
        if downloaded {
            line.push_str(&format!(" {}", "[downloaded]".blue()));
        }
        tracing::info!("{}", line);

        if !details {
            return;
        }
        for feature in &entry.features {
            tracing::info!("      - {}", feature);
        }
        if let Some(requirements) = &entry.requirements {
            let minimal = &requirements.minimal;
            let recommended = &requirements.recommended;
            tracing::info!(
                "      {} RAM {}, CPU {}, GPU {}",
                "Minimum:".dimmed(),
                minimal.ram,
                minimal.cpu,
                minimal.gpu
            );
            tracing::info!(
                "      {} RAM {}, CPU {}, GPU {}",
                "Recommended:".dimmed(),
                recommended.ram,
                recommended.cpu,
                recommended.gpu
            );
        }
    }
}
