use super::progress::ProgressReporter;
use super::transport::Transport;
use super::types::{DownloadTask, FetchOutcome, ProgressUpdate, RemoteSize};
use crate::error::LoopFetchError;
use crate::repository::RemotePath;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use url::Url;

pub struct Downloader<'a, T> {
    transport: &'a T,
    base_url: &'a Url,
    progress: &'a dyn ProgressReporter,
}

impl<'a, T: Transport> Downloader<'a, T> {
    pub fn new(transport: &'a T, base_url: &'a Url, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            transport,
            base_url,
            progress,
        }
    }

    pub fn resolve_url(&self, remote_path: &RemotePath) -> Result<Url, LoopFetchError> {
        remote_path
            .url(self.base_url)
            .ok_or_else(|| LoopFetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: format!("cannot append {}", remote_path),
            })
    }

    /// Builds the transfer for `remote_path`, probing the server for its size.
    pub async fn task(
        &self,
        remote_path: &RemotePath,
        content_root: &Path,
    ) -> Result<DownloadTask, LoopFetchError> {
        let url = self.resolve_url(remote_path)?;
        let expected_size = self.probe_remote_size(&url).await;
        Ok(DownloadTask {
            local_path: remote_path.local_path(content_root),
            url,
            expected_size,
        })
    }

    /// Asks the server for the resource length. Failures count as unknown.
    pub async fn probe_remote_size(&self, url: &Url) -> RemoteSize {
        match self.transport.content_length(url).await {
            Ok(length) => RemoteSize::from(length),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "Could not determine remote size");
                RemoteSize::Unknown
            }
        }
    }

    /// True only if the local file exists and its length equals the declared remote length.
    pub async fn is_already_downloaded(&self, url: &Url, local_path: &Path) -> bool {
        if !tokio::fs::metadata(local_path)
            .await
            .is_ok_and(|metadata| metadata.is_file())
        {
            return false;
        }
        let remote = self.probe_remote_size(url).await;
        Self::local_copy_matches(url, local_path, remote).await
    }

    async fn local_copy_matches(url: &Url, local_path: &Path, remote: RemoteSize) -> bool {
        let Ok(metadata) = tokio::fs::metadata(local_path).await else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }

        match remote {
            RemoteSize::Known(remote) if remote == metadata.len() => true,
            RemoteSize::Known(remote) => {
                tracing::debug!(
                    url = %url,
                    local = metadata.len(),
                    remote,
                    "Local copy size differs from remote, downloading again"
                );
                false
            }
            RemoteSize::Unknown => false,
        }
    }

    /// Streams `url` into `local_path`, overwriting it.
    ///
    /// A failed transfer leaves the partially written file behind.
    pub async fn download(&self, url: &Url, local_path: &Path) -> Result<u64, LoopFetchError> {
        self.transfer(&DownloadTask {
            url: url.clone(),
            local_path: local_path.to_path_buf(),
            expected_size: RemoteSize::Unknown,
        })
        .await
    }

    /// Local write failures are reported as transfer failures of the package.
    async fn transfer(&self, task: &DownloadTask) -> Result<u64, LoopFetchError> {
        let DownloadTask {
            url,
            local_path,
            expected_size,
        } = task;
        let transfer_error = |reason: String| LoopFetchError::Transfer {
            url: url.to_string(),
            reason,
        };
        let write_error = |e: std::io::Error| {
            transfer_error(format!("cannot write {}: {}", local_path.display(), e))
        };

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                transfer_error(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let response = self
            .transport
            .fetch(url)
            .await
            .map_err(|e| transfer_error(e.to_string()))?;
        // A GET without a length falls back to the length from the HEAD request.
        let total = response.content_length.or(expected_size.known());
        let mut body = response.body;

        let file = tokio::fs::File::create(local_path)
            .await
            .map_err(write_error)?;
        let mut writer = tokio::io::BufWriter::new(file);

        self.progress.started(url, total);
        let mut bytes_so_far = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| transfer_error(e.to_string()))?;
            writer.write_all(&chunk).await.map_err(write_error)?;
            bytes_so_far += chunk.len() as u64;
            self.progress.advanced(ProgressUpdate {
                bytes_so_far,
                total,
            });
        }
        writer.flush().await.map_err(write_error)?;

        if let Some(total) = total
            && total != bytes_so_far
        {
            return Err(transfer_error(format!(
                "received {} of {} bytes",
                bytes_so_far, total
            )));
        }

        self.progress.finished(url, bytes_so_far);
        Ok(bytes_so_far)
    }

    /// Downloads a package unless an identically sized copy is already on disk.
    pub async fn fetch_package(
        &self,
        remote_path: &RemotePath,
        content_root: &Path,
    ) -> Result<FetchOutcome, LoopFetchError> {
        let task = self.task(remote_path, content_root).await?;

        if Self::local_copy_matches(&task.url, &task.local_path, task.expected_size).await {
            tracing::info!(url = %task.url, "Already downloaded");
            return Ok(FetchOutcome::Skipped);
        }

        tracing::info!(url = %task.url, output = %task.local_path.display(), "Downloading");
        let bytes = self.transfer(&task).await?;
        Ok(FetchOutcome::Downloaded { bytes })
    }
}
