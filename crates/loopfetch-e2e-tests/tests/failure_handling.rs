use assert_fs::prelude::*;
use loopfetch_e2e_tests::{
    StubTransport, base_url, garageband_2015_store, garageband_2015_transport, init_tracing,
    manifest_plist,
};
use loopfetch_lib::acquisition::{AcquisitionRequest, ContentAcquisitionService, RunMode};
use loopfetch_lib::cancellation::Cancellation;
use loopfetch_lib::download::NoProgress;
use loopfetch_lib::error::LoopFetchError;
use loopfetch_lib::package_set::Selection;
use loopfetch_lib::repository::{ContentYear, LEGACY_DIR, ManifestStore, Product};
use predicates::prelude::*;

const HOLY_GHOST: &str =
    "lp10_ms3_content_2015/MAContent10_AssetPack_0048_AlchemyPadsDigitalHolyGhost.pkg";
const HIP_HOP: &str = "lp10_ms3_content_2015/MAContent10_AssetPack_0325_AppleLoopsHipHop1.pkg";

fn download_request(root: &std::path::Path) -> AcquisitionRequest {
    AcquisitionRequest {
        selection: Selection {
            product: Product::GarageBand,
            years: vec![ContentYear::new("2015")],
        },
        output_root: root.to_path_buf(),
        mode: RunMode::Download,
    }
}

#[tokio::test]
async fn test_broken_transfer_removes_content_tree() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    let store = garageband_2015_store();
    let transport = garageband_2015_transport().with_failing_resource(
        &format!("/{HOLY_GHOST}"),
        vec![2u8; 200],
        128,
    );
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("a broken transfer must fail the run");

    assert!(matches!(err, LoopFetchError::Transfer { .. }), "{err}");
    root.assert(predicate::path::missing());
    // The set is sorted, so nothing after the broken package was attempted.
    assert_eq!(
        transport.fetched(),
        vec![
            "/lp10_ms3_content_2015/garageband1010.plist".to_string(),
            format!("/{HOLY_GHOST}"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_package_is_a_transfer_failure() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    let store = garageband_2015_store();
    // The curated extra package is not on the stub server.
    let transport = garageband_2015_transport();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("a missing package must fail the run");

    assert!(matches!(err, LoopFetchError::Transfer { .. }), "{err}");
    root.assert(predicate::path::missing());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_manifest_aborts_before_any_package() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    let store = garageband_2015_store();
    let transport = StubTransport::new();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("an unreachable manifest must fail the run");

    assert!(matches!(err, LoopFetchError::ManifestFetch { .. }), "{err}");
    assert_eq!(transport.fetched().len(), 1);
    assert!(transport.probed().is_empty());
    root.child("lp10_ms3_content_2015")
        .assert(predicate::path::is_dir());
    Ok(())
}

#[tokio::test]
async fn test_malformed_manifest_is_fatal_and_not_cached() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    let store = garageband_2015_store();
    let transport = StubTransport::new().with_resource(
        "/lp10_ms3_content_2015/garageband1010.plist",
        "<html><body>Not Found</body></html>",
    );
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("a malformed manifest must fail the run");

    assert!(matches!(err, LoopFetchError::ManifestParse { .. }), "{err}");
    root.child("lp10_ms3_content_2015/garageband1010.plist")
        .assert(predicate::path::missing());
    assert_eq!(transport.fetched().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_interrupted_download_keeps_completed_packages() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    // The stale copy is replaced before the interrupt is noticed.
    root.child(HOLY_GHOST).write_binary(b"stale")?;

    let cancellation = Cancellation::new();
    let store = garageband_2015_store();
    let transport = garageband_2015_transport().with_cancel_on_probe(cancellation.clone());
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress)
        .with_cancellation(cancellation);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("the interrupt must stop the run");

    assert!(matches!(err, LoopFetchError::Interrupted), "{err}");
    assert_eq!(std::fs::read(root.child(HOLY_GHOST).path())?, vec![2u8; 200]);
    root.child(HIP_HOP).assert(predicate::path::missing());
    root.child("lp10_ms3_content_2015/garageband1010.plist")
        .assert(predicate::path::is_file());
    Ok(())
}

#[tokio::test]
async fn test_unwritable_package_path_removes_content_tree() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("garageband");
    // A directory where the first package file should go.
    root.child(HOLY_GHOST).create_dir_all()?;

    let store = garageband_2015_store();
    let transport = garageband_2015_transport();
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&download_request(root.path()))
        .await
        .expect_err("an unwritable package path must fail the run");

    assert!(matches!(err, LoopFetchError::Transfer { .. }), "{err}");
    root.assert(predicate::path::missing());
    Ok(())
}

#[tokio::test]
async fn test_escaping_download_name_is_rejected() -> eyre::Result<()> {
    init_tracing();

    let temp = assert_fs::TempDir::new()?;
    let root = temp.child("out").child("garageband");
    let store = ManifestStore::new(LEGACY_DIR).with_manifest(
        "2016",
        Product::GarageBand,
        "garageband1011.plist",
    );
    let transport = StubTransport::new()
        .with_resource(
            "/lp10_ms3_content_2016/garageband1011.plist",
            manifest_plist(&[("../../../escaped.pkg", None)]),
        )
        .with_resource("/lp10_ms3_content_2016/escaped.pkg", vec![6u8; 16])
        .with_resource("/escaped.pkg", vec![6u8; 16]);
    let service = ContentAcquisitionService::new(&store, &transport, base_url(), &NoProgress);

    let err = service
        .run(&AcquisitionRequest {
            selection: Selection {
                product: Product::GarageBand,
                years: vec![],
            },
            output_root: root.path().to_path_buf(),
            mode: RunMode::Download,
        })
        .await
        .expect_err("a manifest entry leaving the content root must fail the run");

    assert!(matches!(err, LoopFetchError::ManifestParse { .. }), "{err}");
    assert_eq!(transport.fetched().len(), 1);
    temp.child("escaped.pkg").assert(predicate::path::missing());
    root.child("lp10_ms3_content_2016/escaped.pkg")
        .assert(predicate::path::missing());
    Ok(())
}
