//! Minimal document model shared by the loader and the mount host.
//!
//! Only the pieces this crate touches are modelled: a `<head>` that receives
//! injected `<script>` elements, plain element trees used as mount containers,
//! and the global custom-element registry extensions define their tags in.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

static CUSTOM_ELEMENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9._]*-[a-z0-9._\-]*$").expect("custom element name pattern is valid")
});

/// Hyphenated names the HTML standard reserves for SVG/MathML.
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Whether `name` may be used with `customElements.define`.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    CUSTOM_ELEMENT_NAME.is_match(name) && !RESERVED_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag_name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// `<script async src=…>` as the loader injects it.
    pub fn async_script(src: impl Into<String>) -> Self {
        let mut script = Self::new("script");
        script.set_attribute("src", src);
        script.set_attribute("async", "");
        script
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("'{0}' is not a valid custom element name")]
    InvalidName(String),
    #[error("custom element '{0}' has already been defined")]
    AlreadyDefined(String),
}

/// Process-wide registry of defined custom element tags.
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    defined: RwLock<BTreeSet<String>>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, name: &str) -> Result<(), DefineError> {
        if !is_valid_custom_element_name(name) {
            return Err(DefineError::InvalidName(name.to_string()));
        }
        if !write_lock(&self.defined).insert(name.to_string()) {
            return Err(DefineError::AlreadyDefined(name.to_string()));
        }
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        read_lock(&self.defined).contains(name)
    }

    /// Defined names in sorted order.
    pub fn defined_names(&self) -> Vec<String> {
        read_lock(&self.defined).iter().cloned().collect()
    }
}

/// The host document: its `<head>` and its custom element registry.
#[derive(Debug)]
pub struct Document {
    head: RwLock<Element>,
    custom_elements: CustomElementRegistry,
}

impl Document {
    pub fn new() -> Self {
        Self {
            head: RwLock::new(Element::new("head")),
            custom_elements: CustomElementRegistry::new(),
        }
    }

    pub fn append_to_head(&self, element: Element) {
        write_lock(&self.head).append_child(element);
    }

    pub fn head(&self) -> Element {
        read_lock(&self.head).clone()
    }

    /// `src` of every script injected so far, in injection order.
    pub fn script_sources(&self) -> Vec<String> {
        read_lock(&self.head)
            .children()
            .iter()
            .filter(|e| e.tag_name() == "script")
            .filter_map(|e| e.attribute("src").map(str::to_string))
            .collect()
    }

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// A panicking writer cannot leave these collections half-updated, so a poisoned
// lock is still safe to read through.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_element_names() {
        assert!(is_valid_custom_element_name("weather-panel"));
        assert!(is_valid_custom_element_name("x-y"));
        assert!(is_valid_custom_element_name("my-el.v2"));
        assert!(!is_valid_custom_element_name("panel"));
        assert!(!is_valid_custom_element_name("Weather-Panel"));
        assert!(!is_valid_custom_element_name("-panel"));
        assert!(!is_valid_custom_element_name("1-panel"));
        assert!(!is_valid_custom_element_name("font-face"));
        assert!(!is_valid_custom_element_name(""));
    }

    #[test]
    fn test_define_rejects_invalid_and_duplicate() {
        let registry = CustomElementRegistry::new();
        assert!(registry.define("acme-card").is_ok());
        assert_eq!(
            registry.define("acme-card"),
            Err(DefineError::AlreadyDefined("acme-card".into()))
        );
        assert_eq!(
            registry.define("card"),
            Err(DefineError::InvalidName("card".into()))
        );
        assert!(registry.is_defined("acme-card"));
        assert!(!registry.is_defined("card"));

        registry.define("acme-banner").unwrap();
        assert_eq!(registry.defined_names(), vec!["acme-banner", "acme-card"]);
    }

    #[test]
    fn test_head_records_async_scripts() {
        let doc = Document::new();
        doc.append_to_head(Element::async_script("http://h/a.js"));
        doc.append_to_head(Element::new("meta"));
        doc.append_to_head(Element::async_script("http://h/b.js"));

        assert_eq!(doc.script_sources(), vec!["http://h/a.js", "http://h/b.js"]);
        assert!(doc.head().children()[0].has_attribute("async"));
    }
}
