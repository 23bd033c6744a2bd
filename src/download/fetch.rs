use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::http::build_client;

/// A started transfer: status line, optional size hint and the body stream.
pub struct FetchResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Streaming fetch primitive.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// `Fetcher` over HTTP(S).
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// No request timeout: a transfer runs until it completes or the
    /// connection fails.
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(None)?,
        })
    }

    /// Requests give up once `timeout` has passed.
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(Some(timeout))?,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError(e.to_string()))?;

        Ok(FetchResponse {
            status: resp.status().as_u16(),
            content_length: resp.content_length(),
            body: Box::new(resp),
        })
    }
}
