pub mod acquisition;
pub mod cancellation;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod package_set;
pub mod repository;
pub mod utils;

pub use config::Config;
pub use error::LoopFetchError;
