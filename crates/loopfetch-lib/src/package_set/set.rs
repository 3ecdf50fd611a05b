use crate::repository::{PackageEntry, RemotePath};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Unique package paths in lexicographic order.
///
/// Products share content packages, so the same path can be produced by
/// several manifests; the first declared size seen for a path is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: BTreeMap<RemotePath, Option<u64>>,
}

impl PackageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the path was already present.
    pub fn insert(&mut self, entry: PackageEntry) -> bool {
        match self.packages.entry(entry.path) {
            Entry::Vacant(vacant) => {
                vacant.insert(entry.declared_size);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, path: &RemotePath) -> bool {
        self.packages.contains_key(path)
    }

    pub fn declared_size(&self, path: &RemotePath) -> Option<u64> {
        self.packages.get(path).copied().flatten()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RemotePath> {
        self.packages.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RemotePath, Option<u64>)> {
        self.packages.iter().map(|(path, size)| (path, *size))
    }
}

impl Extend<PackageEntry> for PackageSet {
    fn extend<I: IntoIterator<Item = PackageEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<PackageEntry> for PackageSet {
    fn from_iter<I: IntoIterator<Item = PackageEntry>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
