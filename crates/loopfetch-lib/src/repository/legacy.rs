use super::types::{ContentYear, RemotePath};
use thiserror::Error;

/// A download name that would resolve outside its content directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("download name {name:?} does not stay inside its content directory")]
pub struct UnsafeDownloadName {
    pub name: String,
}

/// Rewrites manifest download names that point "up and over" into an older
/// year's directory.
///
/// Newer manifests reference relocated packages as `../<legacy_dir>/Foo.pkg`.
/// Such names resolve to `<legacy_dir>/Foo.pkg`; every other name is placed
/// under the manifest year's directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyRewrite {
    legacy_dir: String,
}

impl LegacyRewrite {
    pub fn new(legacy_dir: impl Into<String>) -> Self {
        Self {
            legacy_dir: legacy_dir.into(),
        }
    }

    pub fn legacy_dir(&self) -> &str {
        &self.legacy_dir
    }

    /// Returns the path below the legacy directory if `download_name` uses the legacy marker.
    pub fn strip_marker<'a>(&self, download_name: &'a str) -> Option<&'a str> {
        download_name
            .strip_prefix("../")?
            .strip_prefix(self.legacy_dir.as_str())?
            .strip_prefix('/')
    }

    pub fn is_legacy(&self, download_name: &str) -> bool {
        self.strip_marker(download_name).is_some()
    }

    /// Maps a manifest download name to its path below the content root.
    ///
    /// Apart from the legacy marker itself, names may not contain `.` or `..`
    /// segments or backslashes, and must name at least one segment.
    pub fn apply(
        &self,
        download_name: &str,
        year: &ContentYear,
    ) -> Result<RemotePath, UnsafeDownloadName> {
        let (dir, rest) = match self.strip_marker(download_name) {
            Some(rest) => (self.legacy_dir.clone(), rest),
            None => (year.dir_stub(), download_name),
        };

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let unsafe_segment = segments
            .iter()
            .any(|segment| matches!(*segment, "." | "..") || segment.contains('\\'));
        if segments.is_empty() || unsafe_segment {
            return Err(UnsafeDownloadName {
                name: download_name.to_string(),
            });
        }

        Ok(RemotePath::from_segments(
            std::iter::once(dir.as_str()).chain(segments),
        ))
    }
}
