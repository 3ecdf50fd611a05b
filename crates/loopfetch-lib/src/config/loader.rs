use super::Config;
use super::model::{DEFAULT_BASE_URL, default_user_agent};
use crate::error::LoopFetchError;
use config::Config as ConfigBuilder;

pub const ENV_PREFIX: &str = "LOOPFETCH";

pub fn load_config(config_path: Option<&str>) -> Result<Config, LoopFetchError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("user_agent", default_user_agent())?;

    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path));
    }

    let config_builder = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
