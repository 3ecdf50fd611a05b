mod builder;
mod set;

pub use builder::{PackageSetBuilder, Selection};
pub use set::PackageSet;
