use crate::config::Config;
use crate::error::LoopFetchError;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use std::future::Future;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("transfer from {url} interrupted: {reason}")]
    Interrupted { url: String, reason: String },
}

pub struct FetchResponse {
    /// Declared `Content-Length`, absent for chunked responses
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes, TransportError>>,
}

/// The HTTP operations the resolver and downloader rely on.
pub trait Transport {
    /// Reads the declared length of a resource without downloading it.
    fn content_length(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Option<u64>, TransportError>> + Send;

    /// Starts a streamed GET of a resource.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchResponse, TransportError>> + Send;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, LoopFetchError> {
        // reqwest picks up HTTP_PROXY/HTTPS_PROXY by itself.
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(proxy) = &config.proxy {
            tracing::debug!(proxy = %proxy, "Using configured proxy");
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

impl Transport for HttpTransport {
    async fn content_length(&self, url: &Url) -> Result<Option<u64>, TransportError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(declared_length(response.headers()))
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_length = declared_length(response.headers());
        let url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|source| TransportError::Request {
                    url: url.clone(),
                    source,
                })
            })
            .boxed();

        Ok(FetchResponse {
            content_length,
            body,
        })
    }
}
