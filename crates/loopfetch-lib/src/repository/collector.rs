use super::legacy::UnsafeDownloadName;
use super::store::ManifestStore;
use super::types::{ContentYear, ManifestLocation, PackageEntry};
use crate::cleanup::CleanupManager;
use crate::download::Transport;
use crate::error::LoopFetchError;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// The parts of a content manifest that are actually read.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub packages: BTreeMap<String, ManifestPackage>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestPackage {
    pub download_name: String,
    #[serde(default)]
    pub download_size: Option<u64>,
}

impl Manifest {
    /// Decodes a binary or XML property list.
    pub fn parse(bytes: &[u8]) -> Result<Self, plist::Error> {
        plist::from_bytes(bytes)
    }
}

pub struct ManifestResolver<'a, T> {
    store: &'a ManifestStore,
    transport: &'a T,
    base_url: &'a Url,
    cleanup: CleanupManager,
}

impl<'a, T: Transport> ManifestResolver<'a, T> {
    pub fn new(store: &'a ManifestStore, transport: &'a T, base_url: &'a Url) -> Self {
        Self {
            store,
            transport,
            base_url,
            cleanup: CleanupManager,
        }
    }

    pub fn cache_path(location: &ManifestLocation, cache_root: &Path) -> PathBuf {
        location.remote_path().local_path(cache_root)
    }

    /// Downloads a manifest and keeps a copy below `cache_root`.
    pub async fn fetch_manifest(
        &self,
        location: &ManifestLocation,
        cache_root: &Path,
    ) -> Result<Vec<u8>, LoopFetchError> {
        let url = location.remote_path().url(self.base_url).ok_or_else(|| {
            LoopFetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: format!("cannot append {}", location),
            }
        })?;
        let fetch_error = |reason: String| LoopFetchError::ManifestFetch {
            url: url.to_string(),
            reason,
        };

        tracing::info!(url = %url, "Fetching manifest");
        let response = self
            .transport
            .fetch(&url)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        // The declared length is not trusted for sizing the buffer.
        let mut bytes = Vec::new();
        let mut body = response.body;
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk.map_err(|e| fetch_error(e.to_string()))?);
        }

        let cache_path = Self::cache_path(location, cache_root);
        if let Some(parent) = cache_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                LoopFetchError::DownloadDirectoryCreation {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
        }
        tokio::fs::write(&cache_path, &bytes).await?;
        tracing::debug!(path = %cache_path.display(), bytes = bytes.len(), "Cached manifest");

        Ok(bytes)
    }

    /// Turns manifest entries into package paths for `year`, followed by the
    /// year's curated extra packages.
    ///
    /// A single entry whose name leaves its content directory rejects the whole manifest.
    pub fn extract_packages(
        &self,
        manifest: &Manifest,
        year: &ContentYear,
    ) -> Result<Vec<PackageEntry>, UnsafeDownloadName> {
        let rewrite = self.store.legacy_rewrite();
        let mut entries = manifest
            .packages
            .values()
            .map(|package| {
                rewrite
                    .apply(&package.download_name, year)
                    .map(|path| PackageEntry::new(path, package.download_size))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Not deduplicated against the manifest; the package set merges them.
        entries.extend(self.store.extra_packages(year));
        Ok(entries)
    }

    async fn reject_manifest(
        &self,
        location: &ManifestLocation,
        cache_root: &Path,
        reason: String,
    ) -> LoopFetchError {
        let cache_path = Self::cache_path(location, cache_root);
        self.cleanup.remove_file(&cache_path).await;
        LoopFetchError::ManifestParse {
            path: cache_path,
            reason,
        }
    }

    /// Fetches, parses and extracts one manifest. Any failure is fatal for the year.
    pub async fn resolve(
        &self,
        location: &ManifestLocation,
        year: &ContentYear,
        cache_root: &Path,
    ) -> Result<Vec<PackageEntry>, LoopFetchError> {
        let bytes = self.fetch_manifest(location, cache_root).await?;

        let manifest = match Manifest::parse(&bytes) {
            Ok(manifest) => manifest,
            Err(err) => {
                return Err(self
                    .reject_manifest(location, cache_root, err.to_string())
                    .await);
            }
        };

        let entries = match self.extract_packages(&manifest, year) {
            Ok(entries) => entries,
            Err(err) => {
                return Err(self
                    .reject_manifest(location, cache_root, err.to_string())
                    .await);
            }
        };
        tracing::debug!(
            manifest = %location,
            packages = entries.len(),
            "Extracted packages from manifest"
        );
        Ok(entries)
    }
}
