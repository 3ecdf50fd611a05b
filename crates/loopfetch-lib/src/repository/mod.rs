mod collector;
mod legacy;
mod store;
mod types;

pub use collector::{Manifest, ManifestPackage, ManifestResolver};
pub use legacy::{LegacyRewrite, UnsafeDownloadName};
pub use store::{LEGACY_DIR, ManifestStore};
pub use types::{
    ContentYear, ManifestLocation, PackageEntry, Product, RemotePath, YEAR_DIR_PREFIX,
};
