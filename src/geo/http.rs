//! HTTP transport for provider calls
//!
//! The geocoding client only needs "GET this URL with these headers and give
//! me the body". Keeping that behind a trait lets tests script the provider.

use crate::error::{Error, Result};
use std::future::Future;
use tracing::trace;

/// Asynchronous HTTP GET used by the geocoding client.
pub trait HttpFetcher: Send + Sync {
    /// Performs a GET request and returns the body of a 2xx response.
    ///
    /// Non-2xx responses fail with [`Error::Status`].
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Real HTTP client implementation using reqwest.
///
/// Timeouts are applied by the caller so that the in-flight request is
/// dropped (and aborted) together with the future.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        trace!(url, bytes = body.len(), "provider response");
        Ok(body.to_vec())
    }
}
