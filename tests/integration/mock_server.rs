//! Mock extension service for integration tests

use mockito::{Mock, Server, ServerGuard};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Test fixture that manages a mock extension service
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Catalog endpoint answering `status` with `body`, only for uncached requests.
    pub async fn mock_catalog(&self, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", "/v2/extensions/")
            .match_header("cache-control", "no-cache")
            .match_header("pragma", "no-cache")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Entrypoint script for `extension_id` served from its asset namespace.
    pub async fn mock_script(&self, extension_id: &str, entrypoint: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(
                "GET",
                format!("/v2/extensions/{}/assets/{}", extension_id, entrypoint).as_str(),
            )
            .with_status(status)
            .with_header("content-type", "application/javascript")
            .with_body(body)
            .create_async()
            .await
    }
}
