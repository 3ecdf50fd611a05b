#[allow(clippy::module_inception)]
mod download;
mod progress;
mod transport;
mod types;

pub use download::Downloader;
pub use progress::{NoProgress, ProgressReporter, TracingProgress};
pub use transport::{FetchResponse, HttpTransport, Transport, TransportError};
pub use types::{DownloadTask, FetchOutcome, ProgressUpdate, RemoteSize};
