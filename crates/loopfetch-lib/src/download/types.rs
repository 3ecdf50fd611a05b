use crate::utils::format_size;
use std::path::PathBuf;
use url::Url;

/// Outcome of asking the server how large a resource is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteSize {
    Known(u64),
    Unknown,
}

impl RemoteSize {
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(size) => Some(size),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u64>> for RemoteSize {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

#[derive(Clone, Debug)]
pub struct DownloadTask {
    pub url: Url,
    pub local_path: PathBuf,
    pub expected_size: RemoteSize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The local copy already matched the remote size
    Skipped,
    Downloaded { bytes: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub bytes_so_far: u64,
    pub total: Option<u64>,
}

impl ProgressUpdate {
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.bytes_so_far as f64 / total as f64),
            None => None,
        }
    }

    pub fn human_total(&self) -> Option<String> {
        self.total.map(format_size)
    }
}
