use assert_fs::prelude::*;
use loopfetch_e2e_tests::{
    StubTransport, base_url, garageband_2015_store, garageband_2015_transport, init_tracing,
};
use loopfetch_lib::acquisition::{
    AcquisitionRequest, ContentAcquisitionService, RunMode, RunReport,
};
use loopfetch_lib::cancellation::Cancellation;
use loopfetch_lib::cli::render_list_report;
use loopfetch_lib::download::NoProgress;
use loopfetch_lib::error::LoopFetchError;
use loopfetch_lib::package_set::Selection;
use loopfetch_lib::repository::{ContentYear, Product};
use loopfetch_lib::utils::format_size;
use predicates::prelude::*;

fn list_request(scratch: &std::path::Path) -> AcquisitionRequest {
    AcquisitionRequest {
        selection: Selection {
            product: Product::GarageBand,
            years: vec![ContentYear::new("2015")],
        },
        output_root: scratch.to_path_buf(),
        mode: RunMode::ListOnly,
    }
}

#[tokio::test]
async fn test_list_garageband_2015_reports_sizes_and_total() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let scratch = temp.child("scratch");
    let store = garageband_2015_store();
    let transport = garageband_2015_transport();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let report = service.run(&list_request(scratch.path())).await?;

    let RunReport::Listed(report) = report else {
        panic!("list-only run should produce a listing");
    };
    let urls: Vec<&str> = report.entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "http://audiocontentdownload.apple.com/lp10_ms3_content_2015/MAContent10_AssetPack_0048_AlchemyPadsDigitalHolyGhost.pkg",
            "http://audiocontentdownload.apple.com/lp10_ms3_content_2015/MAContent10_AssetPack_0325_AppleLoopsHipHop1.pkg",
            "http://audiocontentdownload.apple.com/lp10_ms3_content_2015/MAContent10_PremiumPreLoopsHipHop.pkg",
        ]
    );
    assert_eq!(report.entries[0].human_size, format_size(200));
    assert_eq!(report.entries[1].human_size, format_size(100));
    assert_eq!(report.entries[2].size, None);
    assert_eq!(report.total_bytes, 300);
    assert_eq!(report.human_total, format_size(300));

    // Nothing was downloaded and the scratch root is gone.
    assert_eq!(
        transport.fetched(),
        vec!["/lp10_ms3_content_2015/garageband1010.plist"]
    );
    scratch.assert(predicate::path::missing());

    let rendered = render_list_report(&report, false)?;
    assert!(rendered.ends_with("Total: 300.00B"));
    Ok(())
}

#[tokio::test]
async fn test_list_falls_back_to_declared_size() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let store = garageband_2015_store();
    let transport = StubTransport::new().with_resource(
        "/lp10_ms3_content_2015/garageband1010.plist",
        loopfetch_e2e_tests::manifest_plist(&[("Chunked.pkg", Some(4096))]),
    );
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let RunReport::Listed(report) = service.run(&list_request(temp.child("scratch").path())).await?
    else {
        panic!("list-only run should produce a listing");
    };

    assert_eq!(report.entries[0].size, Some(4096));
    assert_eq!(report.entries[0].human_size, "4.00KB");
    assert_eq!(report.total_bytes, 4096);
    Ok(())
}

#[tokio::test]
async fn test_interrupt_during_listing_removes_scratch_root() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let scratch = temp.child("scratch");
    let cancellation = Cancellation::new();
    let store = garageband_2015_store();
    let transport = garageband_2015_transport().with_cancel_on_probe(cancellation.clone());
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress)
        .with_cancellation(cancellation);

    let result = service.run(&list_request(scratch.path())).await;

    assert!(matches!(result, Err(LoopFetchError::Interrupted)));
    assert_eq!(transport.probed().len(), 1);
    scratch.assert(predicate::path::missing());
    temp.assert(predicate::path::is_dir());
    Ok(())
}

#[tokio::test]
async fn test_interrupt_before_manifests_removes_scratch_root() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let scratch = temp.child("scratch");
    let cancellation = Cancellation::new();
    cancellation.cancel();
    let store = garageband_2015_store();
    let transport = garageband_2015_transport();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress)
        .with_cancellation(cancellation);

    let result = service.run(&list_request(scratch.path())).await;

    assert!(matches!(result, Err(LoopFetchError::Interrupted)));
    assert!(transport.fetched().is_empty());
    scratch.assert(predicate::path::missing());
    Ok(())
}

#[tokio::test]
async fn test_listing_serializes_as_json() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let store = garageband_2015_store();
    let transport = garageband_2015_transport();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let RunReport::Listed(report) = service.run(&list_request(temp.child("scratch").path())).await?
    else {
        panic!("list-only run should produce a listing");
    };
    let json: serde_json::Value = serde_json::from_str(&render_list_report(&report, true)?)?;

    assert_eq!(json["total_bytes"], 300);
    assert_eq!(json["human_total"], "300.00B");
    assert_eq!(json["entries"].as_array().map(Vec::len), Some(3));
    Ok(())
}
