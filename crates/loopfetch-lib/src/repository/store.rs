use super::legacy::LegacyRewrite;
use super::types::{ContentYear, ManifestLocation, PackageEntry, Product, RemotePath};
use crate::error::LoopFetchError;
use std::collections::{BTreeMap, BTreeSet};

pub const LEGACY_DIR: &str = "lp10_ms3_content_2013";

const BUILTIN_MANIFESTS: &[(&str, Product, &str)] = &[
    ("2013", Product::GarageBand, "garageband1000_en.plist"),
    ("2013", Product::LogicPro, "logicpro1000_en.plist"),
    ("2015", Product::GarageBand, "garageband1010.plist"),
    ("2015", Product::LogicPro, "logicpro1010.plist"),
    ("2015", Product::LogicPro, "logicpro1020.plist"),
    ("2016", Product::GarageBand, "garageband1011.plist"),
    ("2016", Product::LogicPro, "logicpro1022.plist"),
];

// Installed by the apps but missing from the published 2015 manifests.
const PREMIUM_LOOPS_2015: &[&str] = &[
    "MAContent10_PremiumPreLoopsHipHop.pkg",
    "MAContent10_PremiumPreLoopsElectroHouse.pkg",
    "MAContent10_PremiumPreLoopsDubstep.pkg",
    "MAContent10_PremiumPreLoopsModernRnB.pkg",
    "MAContent10_PremiumPreLoopsTechHouse.pkg",
    "MAContent10_PremiumPreLoopsDeepHouse.pkg",
    "MAContent10_PremiumPreLoopsChillwave.pkg",
    "MAContent10_PremiumPreLoopsGarageBand.pkg",
    "MAContent10_PremiumPreLoopsJamPack1.pkg",
    "MAContent10_PremiumPreLoopsRemixTools.pkg",
    "MAContent10_PremiumPreLoopsRhythmSection.pkg",
    "MAContent10_PremiumPreLoopsSymphony.pkg",
    "MAContent10_PremiumPreLoopsWorld.pkg",
];

/// Immutable registry of the manifests published per (product, year) and the
/// curated packages each year installs on top of its manifests.
#[derive(Clone, Debug)]
pub struct ManifestStore {
    legacy_rewrite: LegacyRewrite,
    manifests: BTreeMap<ContentYear, Vec<(Product, String)>>,
    extra_packages: BTreeMap<ContentYear, Vec<String>>,
}

impl ManifestStore {
    pub fn new(legacy_dir: impl Into<String>) -> Self {
        Self {
            legacy_rewrite: LegacyRewrite::new(legacy_dir),
            manifests: BTreeMap::new(),
            extra_packages: BTreeMap::new(),
        }
    }

    /// The registry of Apple's published audio content.
    pub fn builtin() -> Self {
        let mut store = Self::new(LEGACY_DIR);
        for (year, product, filename) in BUILTIN_MANIFESTS {
            store = store.with_manifest(*year, *product, *filename);
        }
        store.with_extra_packages("2015", PREMIUM_LOOPS_2015.iter().copied())
    }

    pub fn with_manifest(
        mut self,
        year: &str,
        product: Product,
        filename: impl Into<String>,
    ) -> Self {
        self.manifests
            .entry(ContentYear::new(year))
            .or_default()
            .push((product, filename.into()));
        self
    }

    pub fn with_extra_packages<S: Into<String>>(
        mut self,
        year: &str,
        download_names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.extra_packages
            .entry(ContentYear::new(year))
            .or_default()
            .extend(download_names.into_iter().map(Into::into));
        self
    }

    pub fn legacy_rewrite(&self) -> &LegacyRewrite {
        &self.legacy_rewrite
    }

    /// Looks up a registered year by its four-digit name.
    pub fn year(&self, year: &str) -> Option<ContentYear> {
        self.manifests
            .get_key_value(&ContentYear::new(year))
            .map(|(year, _)| year.clone())
    }

    pub fn valid_years(&self) -> Vec<ContentYear> {
        self.manifests.keys().cloned().collect()
    }

    pub fn valid_products(&self) -> BTreeSet<Product> {
        self.manifests
            .values()
            .flatten()
            .map(|(product, _)| *product)
            .collect()
    }

    /// All manifests published for a product in a year, in registration order.
    pub fn manifest_locations(
        &self,
        product: Product,
        year: &ContentYear,
    ) -> Result<Vec<ManifestLocation>, LoopFetchError> {
        let locations: Vec<ManifestLocation> = self
            .manifests
            .get(year)
            .into_iter()
            .flatten()
            .filter(|(registered, _)| *registered == product)
            .map(|(_, filename)| ManifestLocation {
                dir_stub: year.dir_stub(),
                filename: filename.clone(),
            })
            .collect();

        if locations.is_empty() {
            return Err(LoopFetchError::UnknownManifest {
                product: product.to_string(),
                year: year.to_string(),
            });
        }
        Ok(locations)
    }

    pub fn manifest_location(
        &self,
        product: Product,
        year: &ContentYear,
    ) -> Result<ManifestLocation, LoopFetchError> {
        self.manifest_locations(product, year)
            .map(|mut locations| locations.swap_remove(0))
    }

    pub fn extra_packages(&self, year: &ContentYear) -> Vec<PackageEntry> {
        let year_dir = year.dir_stub();
        self.extra_packages
            .get(year)
            .into_iter()
            .flatten()
            .map(|name| {
                PackageEntry::new(
                    RemotePath::from_segments([year_dir.as_str(), name.as_str()]),
                    None,
                )
            })
            .collect()
    }
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::builtin()
    }
}
