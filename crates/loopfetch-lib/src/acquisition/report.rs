use crate::utils::format_size;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub url: String,
    pub size: Option<u64>,
    pub human_size: String,
}

/// What list-only mode found: each package URL with its size, plus the total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListReport {
    pub entries: Vec<ListEntry>,
    pub total_bytes: u64,
    pub human_total: String,
}

impl Default for ListReport {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            total_bytes: 0,
            human_total: format_size(0),
        }
    }
}

impl ListReport {
    /// Unknown sizes are listed but count as zero towards the total.
    pub fn push(&mut self, url: String, size: Option<u64>) {
        self.total_bytes += size.unwrap_or(0);
        self.human_total = format_size(self.total_bytes);
        self.entries.push(ListEntry {
            url,
            size,
            human_size: size.map_or_else(|| "unknown".to_string(), format_size),
        });
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub downloaded: Vec<String>,
    pub skipped: Vec<String>,
    pub bytes_downloaded: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunReport {
    Downloaded(DownloadSummary),
    Listed(ListReport),
}
