mod report;
mod service;

pub use report::{DownloadSummary, ListEntry, ListReport, RunReport};
pub use service::{AcquisitionRequest, ContentAcquisitionService, RunMode};
