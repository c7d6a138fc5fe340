//! 扩展加载器：获取目录、过滤、并行加载入口脚本并发布状态。
//!
//! # Extension Loader
//!
//! One boot pass per [`ExtensionRuntimeContext`]:
//!
//! 1. normalize and publish the base path
//! 2. fetch the catalog (non-2xx means "no extensions")
//! 3. keep descriptors that carry a manifest
//! 4. publish every retained extension's asset namespace
//! 5. load all entrypoint scripts concurrently, each bounded by the script timeout
//! 6. after every script has settled, publish the retained descriptors
//!
//! Steps 4 and 6 are ordering edges: namespaces are visible before any script
//! starts, and the descriptor list is visible only after all of them settled.
//! Nothing here returns an error to the host; failures are reported in the
//! [`LoadReport`] and degrade to absence.

mod report;
mod script;

pub use report::{LoadReport, ScriptOutcome, ScriptStatus};
pub use script::{HttpScriptLoader, LoadResult, ScriptEvaluator, ScriptLoader};

use crate::catalog::{validate_catalog, ExtensionDescriptor, ExtensionLoadError, ManifestClient};
use crate::config::HostConfig;
use crate::runtime::{normalize_base_url, AssetNamespace, ExtensionRuntimeContext};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct ExtensionLoader {
    context: Arc<ExtensionRuntimeContext>,
    manifest_client: ManifestClient,
    script_loader: Arc<dyn ScriptLoader>,
    script_timeout: Option<Duration>,
    configured_base_url: Option<String>,
}

impl ExtensionLoader {
    /// Loader with default configuration and the HTTP script loader.
    pub fn new(context: Arc<ExtensionRuntimeContext>) -> Result<Self> {
        ExtensionLoaderBuilder::new().context(context).build()
    }

    pub fn builder() -> ExtensionLoaderBuilder {
        ExtensionLoaderBuilder::new()
    }

    pub fn context(&self) -> &Arc<ExtensionRuntimeContext> {
        &self.context
    }

    /// Run the boot pass against `base_url`. Never fails: any error is logged,
    /// recorded in the report, and leaves the context with no extensions.
    pub async fn load_extensions(&self, base_url: &str) -> LoadReport {
        self.boot(Some(base_url)).await
    }

    /// Boot pass against the base URL from [`HostConfig`]. A missing base URL
    /// is absorbed like an invalid one.
    pub async fn load_configured(&self) -> LoadReport {
        self.boot(self.configured_base_url.as_deref()).await
    }

    async fn boot(&self, base_url: Option<&str>) -> LoadReport {
        let start = Instant::now();

        if let Err(e) = self.context.begin_boot() {
            warn!(error = %e, "ignoring repeated extension boot pass");
            return LoadReport::aborted(e, self.context.base_path().map(|b| b.to_string()));
        }

        let result = match base_url {
            Some(base_url) => self.run(base_url).await,
            None => Err(ExtensionLoadError::InvalidBaseUrl {
                url: String::new(),
                reason: "no extension service base URL configured".to_string(),
                hint: None,
            }
            .with_hint(format!("Set {}", crate::config::ENV_BASE_URL))),
        };

        let mut report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    error = %e,
                    error_kind = ?e.kind(),
                    "extension loading degraded to no extensions"
                );
                if !self.context.is_loaded() {
                    self.context.publish_loaded_extensions(Vec::new());
                }
                LoadReport::aborted(e, self.context.base_path().map(|b| b.to_string()))
            }
        };
        report.elapsed = start.elapsed();

        info!(
            catalog_size = report.catalog_size,
            loaded = report.loaded_count(),
            unregistered = report.unregistered_count(),
            failed = report.failed_count(),
            aborted = report.is_aborted(),
            duration_ms = report.elapsed.as_millis() as u64,
            "extension boot pass finished"
        );
        report
    }

    async fn run(&self, base_url: &str) -> std::result::Result<LoadReport, ExtensionLoadError> {
        let base_path = normalize_base_url(base_url)?;
        self.context.publish_base_path(base_path.clone());

        let mut report = LoadReport {
            base_path: Some(base_path.clone()),
            ..LoadReport::default()
        };

        let catalog = match self.manifest_client.fetch_catalog(&base_path).await? {
            Some(catalog) => catalog,
            None => {
                self.context.publish_loaded_extensions(Vec::new());
                return Ok(report);
            }
        };
        report.catalog_available = true;
        report.catalog_size = catalog.len();

        for issue in validate_catalog(&catalog) {
            warn!(issue = %issue, "extension catalog entry looks wrong");
        }

        let retained: Vec<ExtensionDescriptor> =
            catalog.into_iter().filter(ExtensionDescriptor::has_manifest).collect();
        debug!(
            retained = retained.len(),
            skipped = report.catalog_size - retained.len(),
            "filtered extensions without a manifest"
        );

        let namespaces: HashMap<String, AssetNamespace> = retained
            .iter()
            .map(|ext| (ext.id.clone(), AssetNamespace::for_extension(&base_path, &ext.id)))
            .collect();
        self.context.publish_asset_namespaces(namespaces.clone());

        let loads = retained.iter().filter_map(|ext| {
            let manifest = ext.manifest.as_ref()?;
            let namespace = namespaces.get(&ext.id)?;
            Some(self.load_entrypoint(ext, namespace.resolve(&manifest.entrypoint)))
        });
        report.outcomes = futures::future::join_all(loads).await;

        self.context.publish_loaded_extensions(retained);
        Ok(report)
    }

    async fn load_entrypoint(&self, ext: &ExtensionDescriptor, script_url: String) -> ScriptOutcome {
        let start = Instant::now();
        let load = self.script_loader.load(&script_url);
        let result = match self.script_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, load).await {
                Ok(r) => Ok(r),
                Err(_) => Err(ExtensionLoadError::ScriptTimedOut {
                    extension_id: ext.id.clone(),
                    url: script_url.clone(),
                    timeout,
                }),
            },
            None => Ok(load.await),
        };

        let status = match result {
            Ok(LoadResult::Loaded) => self.registration_status(ext),
            Ok(LoadResult::Failed { reason }) => ScriptStatus::Failed(ExtensionLoadError::ScriptFailed {
                extension_id: ext.id.clone(),
                url: script_url.clone(),
                reason,
            }),
            Err(e) => ScriptStatus::Failed(e),
        };

        match &status {
            ScriptStatus::Failed(e) => warn!(
                extension_id = ext.id.as_str(),
                script_url = script_url.as_str(),
                error = %e,
                "extension entrypoint failed"
            ),
            other => debug!(
                extension_id = ext.id.as_str(),
                script_url = script_url.as_str(),
                status = other.as_str(),
                duration_ms = start.elapsed().as_millis() as u64,
                "extension entrypoint settled"
            ),
        }

        ScriptOutcome {
            extension_id: ext.id.clone(),
            script_url,
            status,
        }
    }

    fn registration_status(&self, ext: &ExtensionDescriptor) -> ScriptStatus {
        let registry = self.context.document().custom_elements();
        let missing_tags: Vec<String> = ext
            .declared_tags()
            .filter(|tag| !registry.is_defined(tag))
            .map(str::to_string)
            .collect();
        if missing_tags.is_empty() {
            ScriptStatus::Loaded
        } else {
            ScriptStatus::Unregistered { missing_tags }
        }
    }
}

/// Builder for [`ExtensionLoader`].
pub struct ExtensionLoaderBuilder {
    config: HostConfig,
    context: Option<Arc<ExtensionRuntimeContext>>,
    manifest_client: Option<ManifestClient>,
    script_loader: Option<Arc<dyn ScriptLoader>>,
    evaluator: Option<Arc<dyn ScriptEvaluator>>,
    script_timeout: Option<Option<Duration>>,
}

impl ExtensionLoaderBuilder {
    pub fn new() -> Self {
        Self {
            config: HostConfig::default(),
            context: None,
            manifest_client: None,
            script_loader: None,
            evaluator: None,
            script_timeout: None,
        }
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(mut self, context: Arc<ExtensionRuntimeContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn manifest_client(mut self, client: ManifestClient) -> Self {
        self.manifest_client = Some(client);
        self
    }

    /// Replace the HTTP script loader (a JS engine binding, a test double).
    pub fn script_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.script_loader = Some(loader);
        self
    }

    /// Evaluator for the default HTTP script loader. Ignored when a custom
    /// script loader is set.
    pub fn evaluator(mut self, evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Per-script bound; overrides the config value. `None` disables it.
    pub fn script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ExtensionLoader> {
        self.config.validate()?;
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(ExtensionRuntimeContext::new()));

        let manifest_client = match self.manifest_client {
            Some(client) => client,
            None => ManifestClient::new(self.config.http_timeout(), self.config.proxy_url.as_deref())?,
        };

        let script_loader: Arc<dyn ScriptLoader> = match self.script_loader {
            Some(loader) => loader,
            None => {
                let mut loader =
                    HttpScriptLoader::new(manifest_client.http().clone(), context.document().clone());
                if let Some(evaluator) = self.evaluator {
                    loader = loader.with_evaluator(evaluator);
                }
                Arc::new(loader)
            }
        };

        Ok(ExtensionLoader {
            context,
            manifest_client,
            script_loader,
            script_timeout: self
                .script_timeout
                .unwrap_or_else(|| self.config.script_timeout()),
            configured_base_url: self.config.base_url,
        })
    }
}

impl Default for ExtensionLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
