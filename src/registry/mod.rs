//! 放置注册表：按布局插槽查询已加载扩展声明的组件
//!
//! Placement registry: answers "what renders at slot X" from a snapshot of the
//! published extension list.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{ExtensionDescriptor, Placement};

/// A component declaration joined with the id of the extension that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExtensionComponent {
    pub plugin_id: String,
    pub tag_name: String,
    pub label: Option<String>,
    pub icon: Option<String>,
}

/// Read-only projection over one snapshot of loaded extensions.
///
/// Cloning is cheap; clones share the snapshot.
#[derive(Debug, Clone, Default)]
pub struct PlacementRegistry {
    extensions: Arc<Vec<ExtensionDescriptor>>,
}

impl PlacementRegistry {
    pub fn new(extensions: Arc<Vec<ExtensionDescriptor>>) -> Self {
        Self { extensions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Components declared for `placement`, in descriptor order then
    /// declaration order.
    pub fn components_by_placement(&self, placement: Placement) -> Vec<ResolvedExtensionComponent> {
        self.extensions
            .iter()
            .filter_map(|ext| ext.manifest.as_ref().map(|m| (ext.id.as_str(), m)))
            .flat_map(|(plugin_id, manifest)| {
                manifest
                    .components
                    .iter()
                    .filter(move |c| c.placement == placement)
                    .map(move |c| ResolvedExtensionComponent {
                        plugin_id: plugin_id.to_string(),
                        tag_name: c.tag_name.clone(),
                        label: c.label.clone(),
                        icon: c.icon.clone(),
                    })
            })
            .collect()
    }

    /// First component of `plugin_id` declared for `placement`.
    pub fn find(&self, placement: Placement, plugin_id: &str) -> Option<ResolvedExtensionComponent> {
        self.components_by_placement(placement)
            .into_iter()
            .find(|c| c.plugin_id == plugin_id)
    }

    /// Every placement that has at least one component, with its components.
    pub fn layout(&self) -> BTreeMap<Placement, Vec<ResolvedExtensionComponent>> {
        Placement::ALL
            .iter()
            .map(|p| (*p, self.components_by_placement(*p)))
            .filter(|(_, components)| !components.is_empty())
            .collect()
    }

    /// Number of extensions in the snapshot, including ones that declare no
    /// component for any placement.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
