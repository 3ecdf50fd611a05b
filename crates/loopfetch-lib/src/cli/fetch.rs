use crate::acquisition::{ContentAcquisitionService, RunReport};
use crate::cancellation::Cancellation;
use crate::cli::FetchParams;
use crate::download::{HttpTransport, ProgressReporter};
use crate::error::LoopFetchError;
use crate::repository::ManifestStore;
use crate::utils::format_size;

pub async fn run_fetch(
    params: FetchParams,
    progress: &dyn ProgressReporter,
    cancellation: Cancellation,
) -> Result<(), LoopFetchError> {
    let FetchParams {
        app_config,
        base_url,
        request,
    } = params;

    tracing::info!("Content downloads to {}", request.output_root.display());

    let store = ManifestStore::builtin();
    let transport = HttpTransport::new(&app_config)?;
    let service = ContentAcquisitionService::new(&store, &transport, base_url, progress)
        .with_cancellation(cancellation);

    if let RunReport::Downloaded(summary) = service.run(&request).await? {
        tracing::info!(
            "Downloaded {} packages ({}), {} already present",
            summary.downloaded.len(),
            format_size(summary.bytes_downloaded),
            summary.skipped.len()
        );
    }
    Ok(())
}
