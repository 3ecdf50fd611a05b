use super::types::ProgressUpdate;
use url::Url;

/// Receives per-chunk progress of a package transfer.
pub trait ProgressReporter {
    fn started(&self, url: &Url, total: Option<u64>);
    fn advanced(&self, update: ProgressUpdate);
    fn finished(&self, url: &Url, bytes: u64);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn started(&self, _url: &Url, _total: Option<u64>) {}
    fn advanced(&self, _update: ProgressUpdate) {}
    fn finished(&self, _url: &Url, _bytes: u64) {}
}

/// Reports progress as trace events instead of drawing anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn started(&self, url: &Url, total: Option<u64>) {
        tracing::debug!(url = %url, total = ?total, "Transfer started");
    }

    fn advanced(&self, update: ProgressUpdate) {
        match (update.fraction(), update.human_total()) {
            (Some(fraction), Some(total)) => {
                tracing::trace!("{:.2}% of {}", fraction * 100.0, total)
            }
            _ => tracing::trace!("{} bytes", update.bytes_so_far),
        }
    }

    fn finished(&self, url: &Url, bytes: u64) {
        tracing::debug!(url = %url, bytes, "Transfer finished");
    }
}
