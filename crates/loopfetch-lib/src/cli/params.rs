use crate::acquisition::AcquisitionRequest;
use crate::config::Config;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub app_config: Config,
    pub base_url: Url,
    pub request: AcquisitionRequest,
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub app_config: Config,
    pub base_url: Url,
    pub request: AcquisitionRequest,
    pub json: bool,
}
