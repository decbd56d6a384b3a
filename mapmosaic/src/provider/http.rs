//! Blocking HTTP transport for tile requests

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};

use super::types::ProviderError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Performs HTTP GET requests.
///
/// Lets providers be exercised against canned responses in tests.
pub trait HttpClient {
    /// Fetches `url` and returns the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// [`HttpClient`] backed by a blocking reqwest client.
///
/// A `Referer` header can be attached to every request; some WMTS services
/// authorize keys against it.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with a custom timeout and optional `Referer` header.
    pub fn with_options(timeout: Duration, referer: Option<&str>) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = referer {
            let value = HeaderValue::from_str(referer).map_err(|e| {
                ProviderError::InvalidConfig(format!("invalid referer {:?}: {}", referer, e))
            })?;
            headers.insert(REFERER, value);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("mapmosaic/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::HttpError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| ProviderError::HttpError(format!("Failed to read response: {}", e)))?;
        Ok(body.to_vec())
    }
}
