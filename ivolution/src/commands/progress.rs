use anyhow::{Result, anyhow, bail};
use indicatif::HumanBytes;
use ivolution_lib::downloader::{DownloadEvent, DownloadOutcome};
use ivolution_lib::launcher::Launcher;
use ivolution_lib::logging::{progress_bar_style, spinner_style};
use ivolution_lib::metadata::ResolvedUpdate;
use std::path::PathBuf;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Runs one download, drawing its progress and cancelling it on Ctrl-C.
#[instrument(skip_all)]
pub async fn download_with_progress(
    launcher: &Launcher,
    resolved: &ResolvedUpdate,
) -> Result<PathBuf> {
    let current_span = tracing::Span::current();
    // Spinner until the first progress event tells us the size.
    current_span.pb_set_style(&spinner_style("{msg}")?);
    current_span.pb_set_message(&format!("Downloading Ivolution {}...", resolved.version));
    current_span.pb_set_finish_message(&format!(
        "Downloading Ivolution {}... Done",
        resolved.version
    ));

    let mut session = launcher.start_download(resolved)?;

    let cancel = session.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut outcome = None;
    let mut sized = false;
    while let Some(event) = session.next_event().await {
        match event {
            DownloadEvent::Started { url, destination } => {
                tracing::debug!("Fetching {} into {}", url, destination.display());
            }
            DownloadEvent::Progress(progress) => {
                if !sized {
                    current_span.pb_set_style(&progress_bar_style()?);
                    current_span.pb_set_length(progress.total);
                    sized = true;
                }
                current_span.pb_set_position(progress.downloaded);
            }
            DownloadEvent::Finished(finished) => outcome = Some(finished),
        }
    }
    ctrl_c.abort();

    match outcome.ok_or_else(|| anyhow!("Download ended without reporting an outcome"))? {
        DownloadOutcome::Success { path } => {
            if let Ok(metadata) = std::fs::metadata(&path) {
                tracing::debug!("Wrote {}", HumanBytes(metadata.len()));
            }
            Ok(path)
        }
        DownloadOutcome::Failure { error } => Err(error.into()),
        DownloadOutcome::Cancelled { path } => {
            if launcher.config().cleanup_partial {
                bail!("Download cancelled");
            }
            bail!(
                "Download cancelled; the partial file was left at {}",
                path.display()
            )
        }
    }
}
