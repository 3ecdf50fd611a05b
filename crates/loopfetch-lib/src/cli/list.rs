use crate::acquisition::{ContentAcquisitionService, ListReport, RunReport};
use crate::cancellation::Cancellation;
use crate::cli::ListParams;
use crate::download::{HttpTransport, NoProgress};
use crate::error::LoopFetchError;
use crate::repository::ManifestStore;
use eyre::WrapErr;
use std::io::Write;

pub fn render_list_report(report: &ListReport, json: bool) -> Result<String, LoopFetchError> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let mut rendered = String::new();
    for entry in &report.entries {
        rendered.push_str(&format!("{} [{}]\n", entry.url, entry.human_size));
    }
    rendered.push_str(&format!("Total: {}", report.human_total));
    Ok(rendered)
}

pub async fn run_list(params: ListParams, cancellation: Cancellation) -> Result<(), LoopFetchError> {
    let ListParams {
        app_config,
        base_url,
        request,
        json,
    } = params;

    let store = ManifestStore::builtin();
    let transport = HttpTransport::new(&app_config)?;
    let service = ContentAcquisitionService::new(&store, &transport, base_url, &NoProgress)
        .with_cancellation(cancellation);

    if let RunReport::Listed(report) = service.run(&request).await? {
        let rendered = render_list_report(&report, json)?;
        writeln!(std::io::stdout().lock(), "{}", rendered)
            .wrap_err("Failed to write package listing")?;
    }
    Ok(())
}
