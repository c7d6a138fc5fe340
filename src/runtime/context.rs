//! Runtime context holding everything a boot pass publishes.

use crate::catalog::{ExtensionDescriptor, ExtensionLoadError};
use crate::dom::Document;
use crate::registry::PlacementRegistry;
use crate::runtime::AssetNamespace;
use arc_swap::{ArcSwap, ArcSwapOption};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Published extension state for one application boot.
///
/// Built once by the host's composition root and shared by `Arc` with the
/// loader, the placement registry and every mount host. The loader is the only
/// writer; each slot is swapped in whole, so readers observe either "not yet
/// published" or a complete snapshot.
#[derive(Debug)]
pub struct ExtensionRuntimeContext {
    base_path: ArcSwapOption<String>,
    asset_namespaces: ArcSwap<HashMap<String, AssetNamespace>>,
    loaded_extensions: ArcSwapOption<Vec<ExtensionDescriptor>>,
    boot_started: AtomicBool,
    document: Arc<Document>,
    registry: OnceCell<PlacementRegistry>,
}

impl ExtensionRuntimeContext {
    pub fn new() -> Self {
        Self::with_document(Arc::new(Document::new()))
    }

    pub fn with_document(document: Arc<Document>) -> Self {
        Self {
            base_path: ArcSwapOption::empty(),
            asset_namespaces: ArcSwap::from_pointee(HashMap::new()),
            loaded_extensions: ArcSwapOption::empty(),
            boot_started: AtomicBool::new(false),
            document,
            registry: OnceCell::new(),
        }
    }

    /// Normalized extension service base URL, once the loader has published it.
    pub fn base_path(&self) -> Option<Arc<String>> {
        self.base_path.load_full()
    }

    pub fn asset_namespaces(&self) -> Arc<HashMap<String, AssetNamespace>> {
        self.asset_namespaces.load_full()
    }

    pub fn asset_namespace(&self, extension_id: &str) -> Option<AssetNamespace> {
        self.asset_namespaces.load().get(extension_id).cloned()
    }

    /// `None` until the loader's join barrier has been passed.
    pub fn loaded_extensions(&self) -> Option<Arc<Vec<ExtensionDescriptor>>> {
        self.loaded_extensions.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_extensions.load().is_some()
    }

    /// Resolve a reference relative to the extension service base path.
    pub fn resolve_link(&self, relative: &str) -> Option<String> {
        let base = self.base_path.load_full()?;
        let relative = relative.trim().trim_start_matches("./").trim_start_matches('/');
        Some(format!("{}/{}", base, relative))
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Placement registry over the published extension list.
    ///
    /// The registry is built and cached on the first call made after loading
    /// has finished. Earlier calls get an empty registry that is not cached.
    pub fn placement_registry(&self) -> PlacementRegistry {
        if let Some(registry) = self.registry.get() {
            return registry.clone();
        }
        match self.loaded_extensions.load_full() {
            Some(extensions) => self
                .registry
                .get_or_init(|| PlacementRegistry::new(extensions))
                .clone(),
            None => PlacementRegistry::empty(),
        }
    }

    pub(crate) fn begin_boot(&self) -> Result<(), ExtensionLoadError> {
        self.boot_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ExtensionLoadError::AlreadyLoaded)
    }

    pub(crate) fn publish_base_path(&self, base_path: String) {
        self.base_path.store(Some(Arc::new(base_path)));
    }

    pub(crate) fn publish_asset_namespaces(&self, namespaces: HashMap<String, AssetNamespace>) {
        self.asset_namespaces.store(Arc::new(namespaces));
    }

    pub(crate) fn publish_loaded_extensions(&self, extensions: Vec<ExtensionDescriptor>) {
        self.loaded_extensions.store(Some(Arc::new(extensions)));
    }
}

impl Default for ExtensionRuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}
