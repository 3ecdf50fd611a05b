use super::report::{DownloadSummary, ListReport, RunReport};
use crate::cancellation::Cancellation;
use crate::cleanup::CleanupManager;
use crate::download::{Downloader, FetchOutcome, ProgressReporter, Transport};
use crate::error::LoopFetchError;
use crate::package_set::{PackageSet, PackageSetBuilder, Selection};
use crate::repository::{ContentYear, ManifestResolver, ManifestStore};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Download,
    /// Report URLs and sizes; the output root is scratch space and is removed afterwards
    ListOnly,
}

#[derive(Clone, Debug)]
pub struct AcquisitionRequest {
    pub selection: Selection,
    /// Root of the product's content tree; year and legacy directories are created below it
    pub output_root: PathBuf,
    pub mode: RunMode,
}

/// Drives one run: manifests first, then every package of the set in order.
pub struct ContentAcquisitionService<'a, T> {
    store: &'a ManifestStore,
    transport: &'a T,
    base_url: Url,
    progress: &'a dyn ProgressReporter,
    cancellation: Cancellation,
    cleanup: CleanupManager,
}

impl<'a, T: Transport> ContentAcquisitionService<'a, T> {
    pub fn new(
        store: &'a ManifestStore,
        transport: &'a T,
        base_url: Url,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            store,
            transport,
            base_url,
            progress,
            cancellation: Cancellation::new(),
            cleanup: CleanupManager,
        }
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub async fn run(&self, request: &AcquisitionRequest) -> Result<RunReport, LoopFetchError> {
        let result = self.run_steps(request).await;

        match (request.mode, &result) {
            // Nothing in list-only mode is meant to be kept, whatever the outcome.
            (RunMode::ListOnly, _) => self.cleanup.remove_tree(&request.output_root).await,
            (RunMode::Download, Err(LoopFetchError::Transfer { .. })) => {
                tracing::warn!(
                    path = %request.output_root.display(),
                    "Transfer failed, removing downloaded content"
                );
                self.cleanup.remove_tree(&request.output_root).await
            }
            (RunMode::Download, _) => {}
        }

        result
    }

    async fn run_steps(&self, request: &AcquisitionRequest) -> Result<RunReport, LoopFetchError> {
        let resolver = ManifestResolver::new(self.store, self.transport, &self.base_url);
        let builder = PackageSetBuilder::new(self.store, resolver)
            .with_cancellation(self.cancellation.clone());

        let years = builder.effective_years(&request.selection);
        self.ensure_directories(&request.output_root, &years).await?;

        let package_set = builder
            .build(&request.selection, &request.output_root)
            .await?;

        let downloader = Downloader::new(self.transport, &self.base_url, self.progress);
        match request.mode {
            RunMode::ListOnly => self
                .list(&downloader, &package_set)
                .await
                .map(RunReport::Listed),
            RunMode::Download => self
                .download(&downloader, &package_set, &request.output_root)
                .await
                .map(RunReport::Downloaded),
        }
    }

    async fn ensure_directories(
        &self,
        output_root: &Path,
        years: &[ContentYear],
    ) -> Result<(), LoopFetchError> {
        let directories = std::iter::once(output_root.to_path_buf())
            .chain(years.iter().map(|year| output_root.join(year.dir_stub())));

        for directory in directories {
            tokio::fs::create_dir_all(&directory).await.map_err(|e| {
                LoopFetchError::DownloadDirectoryCreation {
                    path: directory.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        tracing::debug!(path = %output_root.display(), "Prepared content directories");
        Ok(())
    }

    async fn list(
        &self,
        downloader: &Downloader<'_, T>,
        package_set: &PackageSet,
    ) -> Result<ListReport, LoopFetchError> {
        let mut report = ListReport::default();

        for (path, declared_size) in package_set.iter() {
            self.cancellation.check()?;
            let url = downloader.resolve_url(path)?;
            let size = downloader
                .probe_remote_size(&url)
                .await
                .known()
                .or(declared_size);
            tracing::debug!(url = %url, size = ?size, "Listed package");
            report.push(url.to_string(), size);
        }

        Ok(report)
    }

    async fn download(
        &self,
        downloader: &Downloader<'_, T>,
        package_set: &PackageSet,
        output_root: &Path,
    ) -> Result<DownloadSummary, LoopFetchError> {
        let mut summary = DownloadSummary::default();

        for path in package_set.paths() {
            self.cancellation.check()?;
            let url = downloader.resolve_url(path)?.to_string();
            match downloader.fetch_package(path, output_root).await? {
                FetchOutcome::Skipped => summary.skipped.push(url),
                FetchOutcome::Downloaded { bytes } => {
                    summary.bytes_downloaded += bytes;
                    summary.downloaded.push(url);
                }
            }
        }

        tracing::info!(
            downloaded = summary.downloaded.len(),
            skipped = summary.skipped.len(),
            "Finished downloading packages"
        );
        Ok(summary)
    }
}
