//! Mount host: instantiates one extension's component inside a container.
//!
//! State machine per activation: `Idle -> Resolving -> Mounted | EmptyNoMatch`.
//! Re-activating with the same plugin id is a no-op; a different plugin id
//! clears the container and starts over from `Idle`. Once mounted, the element
//! belongs to the custom element lifecycle, not to this type.

use crate::catalog::Placement;
use crate::dom::{CustomElementRegistry, Element};
use crate::registry::PlacementRegistry;
use crate::runtime::ExtensionRuntimeContext;
use tracing::debug;

/// Attribute set on every mounted element.
pub const PLACEMENT_ATTRIBUTE: &str = "placement";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountState {
    Idle,
    Resolving,
    Mounted { plugin_id: String, tag_name: String },
    EmptyNoMatch { plugin_id: String },
}

impl MountState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MountState::Mounted { .. } | MountState::EmptyNoMatch { .. })
    }

    fn plugin_id(&self) -> Option<&str> {
        match self {
            MountState::Mounted { plugin_id, .. } | MountState::EmptyNoMatch { plugin_id } => {
                Some(plugin_id.as_str())
            }
            MountState::Idle | MountState::Resolving => None,
        }
    }
}

#[derive(Debug)]
pub struct MountHost {
    placement: Placement,
    container: Element,
    state: MountState,
}

impl MountHost {
    pub fn new(placement: Placement) -> Self {
        Self::with_container(placement, Element::new("div"))
    }

    pub fn with_container(placement: Placement, container: Element) -> Self {
        Self {
            placement,
            container,
            state: MountState::Idle,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn state(&self) -> &MountState {
        &self.state
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    /// Resolve and mount `plugin_id` against the context's published state.
    pub fn activate(&mut self, plugin_id: &str, context: &ExtensionRuntimeContext) -> &MountState {
        let registry = context.placement_registry();
        self.activate_with(plugin_id, &registry, context.document().custom_elements())
    }

    /// Resolve and mount against an explicit registry snapshot.
    ///
    /// Mounts the plugin's first component at this placement whose tag is
    /// defined. A component whose tag was never defined is treated like a
    /// missing one, and with none left the container stays empty.
    pub fn activate_with(
        &mut self,
        plugin_id: &str,
        registry: &PlacementRegistry,
        custom_elements: &CustomElementRegistry,
    ) -> &MountState {
        if self.state.plugin_id() == Some(plugin_id) {
            return &self.state;
        }

        self.container.clear_children();
        self.state = MountState::Resolving;

        let resolved = registry
            .components_by_placement(self.placement)
            .into_iter()
            .find(|c| c.plugin_id == plugin_id && custom_elements.is_defined(&c.tag_name));

        self.state = match resolved {
            Some(component) => {
                let mut element = Element::new(component.tag_name.as_str());
                element.set_attribute(PLACEMENT_ATTRIBUTE, self.placement.as_str());
                self.container.append_child(element);
                debug!(
                    plugin_id,
                    tag_name = component.tag_name.as_str(),
                    placement = self.placement.as_str(),
                    "mounted extension component"
                );
                MountState::Mounted {
                    plugin_id: plugin_id.to_string(),
                    tag_name: component.tag_name,
                }
            }
            None => {
                debug!(
                    plugin_id,
                    placement = self.placement.as_str(),
                    "no mountable extension component"
                );
                MountState::EmptyNoMatch {
                    plugin_id: plugin_id.to_string(),
                }
            }
        };
        &self.state
    }
}
