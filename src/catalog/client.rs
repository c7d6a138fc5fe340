//! Catalog client: one uncached GET against the extension service.

use crate::catalog::{ExtensionDescriptor, ExtensionLoadError};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Proxy;
use std::time::Duration;
use tracing::debug;

/// Path of the catalog endpoint relative to the extension service base.
pub const CATALOG_PATH: &str = "/v2/extensions/";

/// Fetches the extension catalog. Stateless apart from the pooled HTTP client.
#[derive(Clone)]
pub struct ManifestClient {
    client: reqwest::Client,
}

impl ManifestClient {
    pub fn new(timeout: Duration, proxy_url: Option<&str>) -> Result<Self, ExtensionLoadError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                ExtensionLoadError::Internal(format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ExtensionLoadError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shared pools, custom TLS roots, test doubles).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// `base_url` must already be normalized (no trailing slash).
    pub fn catalog_url(base_url: &str) -> String {
        format!("{}{}", base_url, CATALOG_PATH)
    }

    /// `Ok(None)` means the service answered with a non-2xx status: there is no
    /// catalog, which is a normal outcome. Transport failures and undecodable
    /// bodies are errors for the caller to absorb.
    pub async fn fetch_catalog(
        &self,
        base_url: &str,
    ) -> Result<Option<Vec<ExtensionDescriptor>>, ExtensionLoadError> {
        let url = Self::catalog_url(base_url);

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| ExtensionLoadError::CatalogUnavailable {
                url: url.clone(),
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                catalog_url = url.as_str(),
                http_status = status.as_u16(),
                "extension catalog not available"
            );
            return Ok(None);
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| ExtensionLoadError::CatalogUnavailable {
                url: url.clone(),
                reason: format!("Failed to read catalog body: {}", e),
            })?;

        let catalog: Vec<ExtensionDescriptor> =
            serde_json::from_slice(&content).map_err(|e| ExtensionLoadError::MalformedCatalog {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Some(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_url() {
        assert_eq!(
            ManifestClient::catalog_url("https://host.example/api"),
            "https://host.example/api/v2/extensions/"
        );
    }
}
