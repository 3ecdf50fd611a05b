use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

use crate::utils::join_url_segments;

/// Every content year lives in a directory named `<prefix><year>` on the server.
pub const YEAR_DIR_PREFIX: &str = "lp10_ms3_content_";

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    #[default]
    #[value(name = "garageband")]
    GarageBand,
    #[value(name = "logicpro")]
    LogicPro,
}

impl Product {
    pub fn id(&self) -> &'static str {
        match self {
            Self::GarageBand => "garageband",
            Self::LogicPro => "logicpro",
        }
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A manifest release year, e.g. `2015`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentYear(String);

impl ContentYear {
    pub fn new(year: impl Into<String>) -> Self {
        Self(year.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the directory holding this year's content, remotely and locally.
    pub fn dir_stub(&self) -> String {
        format!("{}{}", YEAR_DIR_PREFIX, self.0)
    }
}

impl Display for ContentYear {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `/`-separated path relative to both the base URL and the local content root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            segments
                .into_iter()
                .filter(|segment| !segment.is_empty())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn url(&self, base_url: &Url) -> Option<Url> {
        join_url_segments(base_url, &self.0)
    }

    pub fn local_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.segments());
        path
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a manifest lives, both below the base URL and below the content root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ManifestLocation {
    pub dir_stub: String,
    pub filename: String,
}

impl ManifestLocation {
    pub fn remote_path(&self) -> RemotePath {
        RemotePath::from_segments([self.dir_stub.as_str(), self.filename.as_str()])
    }
}

impl Display for ManifestLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.dir_stub, self.filename)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageEntry {
    pub path: RemotePath,
    /// `DownloadSize` from the manifest, when present
    pub declared_size: Option<u64>,
}

impl PackageEntry {
    pub fn new(path: RemotePath, declared_size: Option<u64>) -> Self {
        Self {
            path,
            declared_size,
        }
    }
}
