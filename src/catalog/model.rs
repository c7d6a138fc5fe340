//! Extension catalog data model.
//!
//! These types mirror the JSON served by `GET <base>/v2/extensions/`. They are
//! immutable once fetched: the loader never edits a descriptor, it only filters
//! and publishes them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::dom::is_valid_custom_element_name;

/// Layout slot in the host where extension components may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Overlay,
    Top,
    Bottom,
    Left,
    Center,
    Right,
}

impl Placement {
    pub const ALL: [Placement; 6] = [
        Placement::Overlay,
        Placement::Top,
        Placement::Bottom,
        Placement::Left,
        Placement::Center,
        Placement::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Overlay => "overlay",
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Center => "center",
            Placement::Right => "right",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown placement '{}' (expected one of overlay, top, bottom, left, center, right)",
                    s
                )
            })
    }
}

/// A UI component an extension promises to register once its entrypoint runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub tag_name: String,
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Declarative part of an extension: where its code lives and what it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    /// Script path relative to the extension's asset namespace.
    pub entrypoint: String,
    /// Declaration order is preserved.
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

/// One entry of the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// `None` marks a non-UI extension that never takes part in loading or placement.
    #[serde(default)]
    pub manifest: Option<ExtensionManifest>,
}

impl ExtensionDescriptor {
    pub fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }

    /// Tag names this extension is expected to define, in declaration order.
    pub fn declared_tags(&self) -> impl Iterator<Item = &str> {
        self.manifest
            .iter()
            .flat_map(|m| m.components.iter())
            .map(|c| c.tag_name.as_str())
    }

    /// Declaration-level checks. Findings are advisory: the loader reports them
    /// but does not drop the descriptor.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.id.trim().is_empty() {
            issues.push(ValidationIssue::EmptyId);
        } else if !is_path_safe_id(&self.id) {
            issues.push(ValidationIssue::UnsafeId(self.id.clone()));
        }
        if let Some(manifest) = &self.manifest {
            if manifest.entrypoint.trim().is_empty() {
                issues.push(ValidationIssue::EmptyEntrypoint {
                    extension_id: self.id.clone(),
                });
            }
            for component in &manifest.components {
                if !is_valid_custom_element_name(&component.tag_name) {
                    issues.push(ValidationIssue::InvalidTagName {
                        extension_id: self.id.clone(),
                        tag_name: component.tag_name.clone(),
                    });
                }
            }
        }
        issues
    }
}

// Ids become one URL path segment of the asset namespace.
fn is_path_safe_id(id: &str) -> bool {
    id != "."
        && id != ".."
        && !id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '%'))
}

/// Checks every descriptor and flags ids that appear more than once.
pub fn validate_catalog(catalog: &[ExtensionDescriptor]) -> Vec<ValidationIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for descriptor in catalog {
        issues.extend(descriptor.validate());
        if !descriptor.id.is_empty() && !seen.insert(descriptor.id.as_str()) {
            issues.push(ValidationIssue::DuplicateId(descriptor.id.clone()));
        }
    }
    issues
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyId,
    UnsafeId(String),
    EmptyEntrypoint { extension_id: String },
    InvalidTagName { extension_id: String, tag_name: String },
    DuplicateId(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyId => write!(f, "extension descriptor has an empty id"),
            ValidationIssue::UnsafeId(id) => {
                write!(f, "extension id '{}' is not usable as a URL path segment", id)
            }
            ValidationIssue::EmptyEntrypoint { extension_id } => {
                write!(f, "extension '{}' declares an empty entrypoint", extension_id)
            }
            ValidationIssue::InvalidTagName {
                extension_id,
                tag_name,
            } => write!(
                f,
                "extension '{}' declares '{}', which is not a valid custom element name",
                extension_id, tag_name
            ),
            ValidationIssue::DuplicateId(id) => {
                write!(f, "extension id '{}' appears more than once in the catalog", id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {
            "id": "weather",
            "name": "Weather",
            "version": "1.2.0",
            "manifest": {
                "entrypoint": "main.js",
                "components": [
                    {"tagName": "weather-banner", "placement": "top", "label": "Weather"},
                    {"tagName": "weather-panel", "placement": "center", "icon": "cloud"}
                ]
            }
        },
        {"id": "audit-hooks", "name": "Audit", "version": "0.1.0", "manifest": null},
        {"id": "bare", "name": "Bare", "version": "0.0.1"}
    ]"#;

    #[test]
    fn test_catalog_deserializes_camel_case() {
        let catalog: Vec<ExtensionDescriptor> = serde_json::from_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);

        let manifest = catalog[0].manifest.as_ref().unwrap();
        assert_eq!(manifest.entrypoint, "main.js");
        assert_eq!(manifest.components[0].tag_name, "weather-banner");
        assert_eq!(manifest.components[0].placement, Placement::Top);
        assert_eq!(manifest.components[0].label.as_deref(), Some("Weather"));
        assert_eq!(manifest.components[1].icon.as_deref(), Some("cloud"));

        assert!(!catalog[1].has_manifest());
        assert!(!catalog[2].has_manifest());
    }

    #[test]
    fn test_unknown_placement_is_rejected() {
        let raw = r#"{"tagName": "x-y", "placement": "sidebar"}"#;
        assert!(serde_json::from_str::<ComponentDescriptor>(raw).is_err());
        assert!("sidebar".parse::<Placement>().is_err());
        assert_eq!("Center".parse::<Placement>().unwrap(), Placement::Center);
    }

    #[test]
    fn test_validate_reports_bad_tags_and_duplicates() {
        let mut catalog: Vec<ExtensionDescriptor> = serde_json::from_str(CATALOG).unwrap();
        catalog[0]
            .manifest
            .as_mut()
            .unwrap()
            .components
            .push(ComponentDescriptor {
                tag_name: "Panel".into(),
                placement: Placement::Left,
                label: None,
                icon: None,
            });
        catalog.push(catalog[1].clone());

        let issues = validate_catalog(&catalog);
        assert!(issues.contains(&ValidationIssue::InvalidTagName {
            extension_id: "weather".into(),
            tag_name: "Panel".into()
        }));
        assert!(issues.contains(&ValidationIssue::DuplicateId("audit-hooks".into())));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_validate_flags_ids_that_escape_their_path_segment() {
        let catalog: Vec<ExtensionDescriptor> = serde_json::from_str(CATALOG).unwrap();
        let mut weather = catalog[0].clone();
        for id in ["../admin", "maps?x=1", "maps#top", "a b", ".."] {
            weather.id = id.to_string();
            assert_eq!(weather.validate(), vec![ValidationIssue::UnsafeId(id.to_string())]);
        }

        weather.id = "weather.v2_beta-1".into();
        assert!(weather.validate().is_empty());
    }

    #[test]
    fn test_declared_tags_follow_declaration_order() {
        let catalog: Vec<ExtensionDescriptor> = serde_json::from_str(CATALOG).unwrap();
        let tags: Vec<&str> = catalog[0].declared_tags().collect();
        assert_eq!(tags, vec!["weather-banner", "weather-panel"]);
        assert_eq!(catalog[1].declared_tags().count(), 0);
    }
}
