//! Catalog fixtures and a scripted `ScriptLoader` double

use async_trait::async_trait;
use extension_host::{ExtensionRuntimeContext, LoadResult, ScriptLoader};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Three extensions: two UI components (top + center), one backend-only, one center.
pub const CATALOG: &str = r#"[
    {
        "id": "weather",
        "name": "Weather",
        "version": "1.4.0",
        "manifest": {
            "entrypoint": "main.js",
            "components": [
                {"tagName": "weather-banner", "placement": "top", "label": "Weather"},
                {"tagName": "weather-panel", "placement": "center", "label": "Forecast", "icon": "cloud.svg"}
            ]
        }
    },
    {"id": "audit", "name": "Audit hooks", "version": "0.9.0", "manifest": null},
    {
        "id": "notes",
        "name": "Notes",
        "version": "2.0.1",
        "manifest": {
            "entrypoint": "dist/notes.js",
            "components": [
                {"tagName": "notes-board", "placement": "center", "label": "Notes"}
            ]
        }
    }
]"#;

pub const MANIFESTLESS_CATALOG: &str = r#"[
    {"id": "a", "name": "A", "version": "1.0.0", "manifest": null},
    {"id": "b", "name": "B", "version": "1.0.0"}
]"#;

#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Settle successfully after defining these tags.
    Define(Vec<&'static str>),
    /// Settle successfully without defining anything.
    Silent,
    Fail(&'static str),
    /// Never settle within any reasonable timeout.
    Hang,
}

#[derive(Debug, Clone)]
pub struct Observation {
    pub extension_id: String,
    pub url: String,
    pub namespace_visible: bool,
    pub loaded_list_published: bool,
}

pub struct FakeScriptLoader {
    context: Arc<ExtensionRuntimeContext>,
    behaviours: HashMap<&'static str, Behaviour>,
    delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub observations: Mutex<Vec<Observation>>,
}

impl FakeScriptLoader {
    pub fn new(context: Arc<ExtensionRuntimeContext>) -> Self {
        Self {
            context,
            behaviours: HashMap::new(),
            delay: Duration::from_millis(20),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            observations: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, extension_id: &'static str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(extension_id, behaviour);
        self
    }

    /// The fixture catalog with every tag defined.
    pub fn defining_all(context: Arc<ExtensionRuntimeContext>) -> Self {
        Self::new(context)
            .on("weather", Behaviour::Define(vec!["weather-banner", "weather-panel"]))
            .on("notes", Behaviour::Define(vec!["notes-board"]))
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().clone()
    }
}

/// `<base>/v2/extensions/<id>/assets/<path>` -> `<id>`
pub fn extension_id_from_url(url: &str) -> String {
    url.split("/v2/extensions/")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ScriptLoader for FakeScriptLoader {
    async fn load(&self, url: &str) -> LoadResult {
        let extension_id = extension_id_from_url(url);
        self.observations.lock().unwrap().push(Observation {
            extension_id: extension_id.clone(),
            url: url.to_string(),
            namespace_visible: self.context.asset_namespace(&extension_id).is_some(),
            loaded_list_published: self.context.is_loaded(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let behaviour = self
            .behaviours
            .get(extension_id.as_str())
            .cloned()
            .unwrap_or(Behaviour::Silent);

        if matches!(behaviour, Behaviour::Hang) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match behaviour {
            Behaviour::Define(tags) => {
                for tag in tags {
                    self.context.document().custom_elements().define(tag).unwrap();
                }
                LoadResult::Loaded
            }
            Behaviour::Silent | Behaviour::Hang => LoadResult::Loaded,
            Behaviour::Fail(reason) => LoadResult::failed(reason),
        }
    }
}
