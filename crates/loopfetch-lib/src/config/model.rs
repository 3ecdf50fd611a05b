use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://audiocontentdownload.apple.com";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Host serving the year directories and manifests
    pub base_url: String,
    /// Explicit proxy URL; the standard proxy environment variables apply without it
    #[serde(default)]
    pub proxy: Option<String>,
    /// Download root used when `--output` is not given
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            output_dir: None,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    concat!("loopfetch/", env!("CARGO_PKG_VERSION")).to_string()
}
