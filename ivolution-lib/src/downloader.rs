use crate::error::UpdateError;
use crate::http::HttpClient;
use crate::metadata::DownloadTarget;
use crate::progress::{ProgressEvent, ProgressTracker};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What a running download reports, in order: one `Started`, any number of
/// `Progress`, one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Started { url: String, destination: PathBuf },
    Progress(ProgressEvent),
    Finished(DownloadOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { path: PathBuf },
    Failure { error: UpdateError },
    /// `path` is the `.part` file, left on disk unless cleanup is enabled.
    Cancelled { path: PathBuf },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

enum Completion {
    Finished,
    Cancelled,
}

/// Streams one file at a time from a URL to disk.
///
/// Bytes go to [DownloadTarget::partial_path] and are moved onto the
/// destination only once the whole body has arrived, so a file at the
/// destination is always a complete download.
///
/// A `Downloader` runs at most one download. [Downloader::start] rejects a
/// second request with [UpdateError::DownloadInProgress] until the running one
/// has reported its outcome; nothing is queued.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: HttpClient,
    cleanup_partial: bool,
    slot: Arc<Semaphore>,
}

/// Handle to a running download.
pub struct DownloadSession {
    events: mpsc::UnboundedReceiver<DownloadEvent>,
    cancel: CancellationToken,
    task: JoinHandle<DownloadOutcome>,
}

impl Downloader {
    pub fn new(client: HttpClient, cleanup_partial: bool) -> Self {
        Self {
            client,
            cleanup_partial,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Spawns the download on the current tokio runtime.
    pub fn start(&self, target: DownloadTarget) -> Result<DownloadSession, UpdateError> {
        let permit = self
            .slot
            .clone()
            .try_acquire_owned()
            .map_err(|_| UpdateError::DownloadInProgress)?;

        let (events_tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let client = self.client.clone();
        let cleanup_partial = self.cleanup_partial;
        let task_cancel = cancel.clone();
        let span = tracing::debug_span!("download", url = %target.url);

        let task = tokio::spawn(
            async move {
                let _ = events_tx.send(DownloadEvent::Started {
                    url: target.url.clone(),
                    destination: target.destination.clone(),
                });

                let outcome =
                    run_download(&client, &target, cleanup_partial, &task_cancel, &events_tx)
                        .await;

                // Free the slot before reporting, so a caller reacting to the
                // outcome can start the next download straight away.
                drop(permit);
                let _ = events_tx.send(DownloadEvent::Finished(outcome.clone()));
                outcome
            }
            .instrument(span),
        );

        Ok(DownloadSession {
            events,
            cancel,
            task,
        })
    }
}

impl DownloadSession {
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }

    /// Stops reading at the next chunk boundary; the outcome becomes `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Discards remaining events and waits for the outcome.
    pub async fn wait(mut self) -> DownloadOutcome {
        while self.events.recv().await.is_some() {}
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => DownloadOutcome::Failure {
                error: UpdateError::Network(format!("download task failed: {err}")),
            },
        }
    }
}

async fn run_download(
    client: &HttpClient,
    target: &DownloadTarget,
    cleanup_partial: bool,
    cancel: &CancellationToken,
    events: &mpsc::UnboundedSender<DownloadEvent>,
) -> DownloadOutcome {
    let partial = target.partial_path();
    let mut file_created = false;

    let result = transfer(client, target, &partial, cancel, events, &mut file_created).await;
    let outcome = match result {
        Ok(Completion::Finished) => {
            let path = target.destination.clone();
            tracing::debug!("Downloaded {} to {}", target.url, path.display());
            return DownloadOutcome::Success { path };
        }
        Ok(Completion::Cancelled) => {
            tracing::debug!("Download of {} cancelled", target.url);
            DownloadOutcome::Cancelled { path: partial.clone() }
        }
        Err(error) => {
            tracing::debug!("Download of {} failed: {}", target.url, error);
            DownloadOutcome::Failure { error }
        }
    };

    // Only remove what this download wrote.
    if cleanup_partial && file_created {
        remove_partial(&partial).await;
    }

    outcome
}

async fn transfer(
    client: &HttpClient,
    target: &DownloadTarget,
    partial: &Path,
    cancel: &CancellationToken,
    events: &mpsc::UnboundedSender<DownloadEvent>,
    file_created: &mut bool,
) -> Result<Completion, UpdateError> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(Completion::Cancelled),
        response = client.get(&target.url) => response?,
    };

    let mut tracker = match response.content_length() {
        Some(length) => ProgressTracker::new(Some(length)),
        None => ProgressTracker::estimated(target.expected_size),
    };
    tracing::debug!(total = ?tracker.total(), "Response received");

    if let Some(parent) = target
        .destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| UpdateError::filesystem(parent, e))?;
    }

    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| UpdateError::filesystem(partial, e))?;
    *file_created = true;

    let mut stream = response.bytes_stream();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Completion::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }

        file.write_all(&chunk)
            .await
            .map_err(|e| UpdateError::filesystem(partial, e))?;

        if let Some(progress) = tracker.advance(chunk.len() as u64) {
            let _ = events.send(DownloadEvent::Progress(progress));
        }
    }

    file.flush()
        .await
        .map_err(|e| UpdateError::filesystem(partial, e))?;
    drop(file);
    tracing::debug!(bytes = tracker.downloaded(), "Stream finished");

    tokio::fs::rename(partial, &target.destination)
        .await
        .map_err(|e| UpdateError::filesystem(&target.destination, e))?;

    if let Some(progress) = tracker.finish() {
        let _ = events.send(DownloadEvent::Progress(progress));
    }

    Ok(Completion::Finished)
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove partial download {}: {}", path.display(), e),
    }
}
