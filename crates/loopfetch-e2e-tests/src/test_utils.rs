use bytes::Bytes;
use futures::StreamExt;
use loopfetch_lib::cancellation::Cancellation;
use loopfetch_lib::download::{
    FetchResponse, ProgressReporter, ProgressUpdate, Transport, TransportError,
};
use loopfetch_lib::repository::{LEGACY_DIR, ManifestStore, Product};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const BASE_URL: &str = "http://audiocontentdownload.apple.com";

const CHUNK_SIZE: usize = 64;

#[derive(Clone, Debug)]
struct StubResource {
    body: Vec<u8>,
    advertise_length: bool,
    fail_after: Option<usize>,
}

/// In-memory stand-in for the content server, keyed by URL path.
#[derive(Default)]
pub struct StubTransport {
    resources: HashMap<String, StubResource>,
    fetch_disabled: bool,
    cancel_on_probe: Option<Cancellation>,
    fetches: Mutex<Vec<String>>,
    probes: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, path: &str, resource: StubResource) -> Self {
        self.resources.insert(path.to_string(), resource);
        self
    }

    pub fn with_resource(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with(
            path,
            StubResource {
                body: body.into(),
                advertise_length: true,
                fail_after: None,
            },
        )
    }

    /// A resource served without a `Content-Length`.
    pub fn with_unsized_resource(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with(
            path,
            StubResource {
                body: body.into(),
                advertise_length: false,
                fail_after: None,
            },
        )
    }

    /// A resource whose transfer breaks after `fail_after` bytes.
    pub fn with_failing_resource(
        self,
        path: &str,
        body: impl Into<Vec<u8>>,
        fail_after: usize,
    ) -> Self {
        self.with(
            path,
            StubResource {
                body: body.into(),
                advertise_length: true,
                fail_after: Some(fail_after),
            },
        )
    }

    /// Every GET fails; size probes keep working.
    pub fn with_fetch_disabled(mut self) -> Self {
        self.fetch_disabled = true;
        self
    }

    /// Simulates an interrupt arriving while the first size probe is in flight.
    pub fn with_cancel_on_probe(mut self, cancellation: Cancellation) -> Self {
        self.cancel_on_probe = Some(cancellation);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches
            .lock()
            .map(|fetches| fetches.clone())
            .unwrap_or_default()
    }

    pub fn probed(&self) -> Vec<String> {
        self.probes
            .lock()
            .map(|probes| probes.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, url: &Url) -> Result<&StubResource, TransportError> {
        self.resources
            .get(url.path())
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

impl Transport for StubTransport {
    async fn content_length(&self, url: &Url) -> Result<Option<u64>, TransportError> {
        if let Ok(mut probes) = self.probes.lock() {
            probes.push(url.path().to_string());
        }
        if let Some(cancellation) = &self.cancel_on_probe {
            cancellation.cancel();
        }

        let resource = self.lookup(url)?;
        Ok(resource
            .advertise_length
            .then_some(resource.body.len() as u64))
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse, TransportError> {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push(url.path().to_string());
        }
        if self.fetch_disabled {
            return Err(TransportError::Interrupted {
                url: url.to_string(),
                reason: "fetching is disabled for this test".to_string(),
            });
        }

        let resource = self.lookup(url)?.clone();
        let served = resource.fail_after.unwrap_or(resource.body.len());
        let mut chunks: Vec<Result<Bytes, TransportError>> = resource.body[..served]
            .chunks(CHUNK_SIZE)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        if resource.fail_after.is_some() {
            chunks.push(Err(TransportError::Interrupted {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            }));
        }

        Ok(FetchResponse {
            content_length: resource
                .advertise_length
                .then_some(resource.body.len() as u64),
            body: futures::stream::iter(chunks).boxed(),
        })
    }
}

/// Records every progress callback.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
    finished: Mutex<Vec<(String, u64)>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates
            .lock()
            .map(|updates| updates.clone())
            .unwrap_or_default()
    }

    pub fn finished(&self) -> Vec<(String, u64)> {
        self.finished
            .lock()
            .map(|finished| finished.clone())
            .unwrap_or_default()
    }
}

impl ProgressReporter for RecordingProgress {
    fn started(&self, _url: &Url, _total: Option<u64>) {}

    fn advanced(&self, update: ProgressUpdate) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(update);
        }
    }

    fn finished(&self, url: &Url, bytes: u64) {
        if let Ok(mut finished) = self.finished.lock() {
            finished.push((url.to_string(), bytes));
        }
    }
}

/// Renders an XML property list manifest with the given download names and sizes.
pub fn manifest_plist(packages: &[(&str, Option<u64>)]) -> String {
    let entries: String = packages
        .iter()
        .enumerate()
        .map(|(i, (name, size))| {
            let size = size
                .map(|size| format!("<key>DownloadSize</key><integer>{size}</integer>"))
                .unwrap_or_default();
            format!(
                "<key>MAContent10_AssetPack_{i:04}</key><dict>\
                 <key>DownloadName</key><string>{name}</string>{size}\
                 <key>IsMandatory</key><false/></dict>"
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\"><dict><key>Packages</key><dict>{entries}</dict></dict></plist>\n"
    )
}

/// GarageBand 2015 with a single curated extra package.
pub fn garageband_2015_store() -> ManifestStore {
    ManifestStore::new(LEGACY_DIR)
        .with_manifest("2015", Product::GarageBand, "garageband1010.plist")
        .with_extra_packages("2015", ["MAContent10_PremiumPreLoopsHipHop.pkg"])
}

/// Serves the GarageBand 2015 manifest and its two packages (100 and 200 bytes).
/// The curated extra package is not on the server.
pub fn garageband_2015_transport() -> StubTransport {
    StubTransport::new()
        .with_resource(
            "/lp10_ms3_content_2015/garageband1010.plist",
            manifest_plist(&[
                ("MAContent10_AssetPack_0325_AppleLoopsHipHop1.pkg", Some(100)),
                ("MAContent10_AssetPack_0048_AlchemyPadsDigitalHolyGhost.pkg", Some(200)),
            ]),
        )
        .with_resource(
            "/lp10_ms3_content_2015/MAContent10_AssetPack_0325_AppleLoopsHipHop1.pkg",
            vec![1u8; 100],
        )
        .with_resource(
            "/lp10_ms3_content_2015/MAContent10_AssetPack_0048_AlchemyPadsDigitalHolyGhost.pkg",
            vec![2u8; 200],
        )
}

pub fn base_url() -> Url {
    Url::parse(BASE_URL).expect("valid base URL")
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("loopfetch_lib=debug,loopfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
