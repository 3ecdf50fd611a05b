use super::set::PackageSet;
use crate::cancellation::Cancellation;
use crate::download::Transport;
use crate::error::LoopFetchError;
use crate::repository::{ContentYear, ManifestResolver, ManifestStore, Product};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub product: Product,
    /// Empty selects every registered year
    pub years: Vec<ContentYear>,
}

pub struct PackageSetBuilder<'a, T> {
    store: &'a ManifestStore,
    resolver: ManifestResolver<'a, T>,
    cancellation: Cancellation,
}

impl<'a, T: Transport> PackageSetBuilder<'a, T> {
    pub fn new(store: &'a ManifestStore, resolver: ManifestResolver<'a, T>) -> Self {
        Self {
            store,
            resolver,
            cancellation: Cancellation::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The requested years, sorted and unique, or all registered years if none were requested.
    pub fn effective_years(&self, selection: &Selection) -> Vec<ContentYear> {
        let mut years = if selection.years.is_empty() {
            self.store.valid_years()
        } else {
            selection.years.clone()
        };
        years.sort();
        years.dedup();
        years
    }

    /// Resolves every manifest of the selection into one package set.
    ///
    /// The first manifest that cannot be fetched or parsed aborts the build.
    pub async fn build(
        &self,
        selection: &Selection,
        cache_root: &Path,
    ) -> Result<PackageSet, LoopFetchError> {
        let mut package_set = PackageSet::new();

        for year in self.effective_years(selection) {
            for location in self.store.manifest_locations(selection.product, &year)? {
                self.cancellation.check()?;
                let entries = self.resolver.resolve(&location, &year, cache_root).await?;
                if entries.is_empty() {
                    tracing::debug!(manifest = %location, "Manifest lists no packages");
                }
                package_set.extend(entries);
            }
        }

        tracing::info!(
            product = %selection.product,
            packages = package_set.len(),
            "Resolved package set"
        );
        Ok(package_set)
    }
}
