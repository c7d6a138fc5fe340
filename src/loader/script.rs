//! Script loading capability.
//!
//! The loader only needs "load this URL and tell me when it settled". How the
//! script is actually brought into the host (a `<script>` tag, an embedded JS
//! engine, a test double) is behind [`ScriptLoader`].

use crate::dom::{Document, Element};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Settled state of one script load. There is no rejected state: a failing
/// script still settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    Loaded,
    Failed { reason: String },
}

impl LoadResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        LoadResult::Failed {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load(&self, url: &str) -> LoadResult;
}

/// Runs fetched script source inside the host. Extensions run with host-level
/// trust; an evaluator typically defines the extension's custom elements in
/// `document.custom_elements()`.
pub trait ScriptEvaluator: Send + Sync {
    fn evaluate(&self, url: &str, source: &str, document: &Document) -> crate::Result<()>;
}

/// Native script loader: injects `<script async src>` into the document head,
/// fetches the script over HTTP and hands it to the evaluator, if any.
pub struct HttpScriptLoader {
    client: reqwest::Client,
    document: Arc<Document>,
    evaluator: Option<Arc<dyn ScriptEvaluator>>,
}

impl HttpScriptLoader {
    pub fn new(client: reqwest::Client, document: Arc<Document>) -> Self {
        Self {
            client,
            document,
            evaluator: None,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }
}

#[async_trait]
impl ScriptLoader for HttpScriptLoader {
    async fn load(&self, url: &str) -> LoadResult {
        self.document.append_to_head(Element::async_script(url));

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return LoadResult::failed(format!("HTTP request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return LoadResult::failed(format!("HTTP {}", status));
        }

        let source = match response.text().await {
            Ok(s) => s,
            Err(e) => return LoadResult::failed(format!("Failed to read script: {}", e)),
        };

        if let Some(evaluator) = &self.evaluator {
            if let Err(e) = evaluator.evaluate(url, &source, &self.document) {
                return LoadResult::failed(format!("Script raised an error: {}", e));
            }
        }

        debug!(script_url = url, bytes = source.len(), "extension script settled");
        LoadResult::Loaded
    }
}
