//! Outcome of one boot pass.

use crate::catalog::{ErrorKind, ExtensionLoadError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ScriptStatus {
    Loaded,
    /// The script settled successfully but some declared tags were never defined.
    Unregistered { missing_tags: Vec<String> },
    Failed(ExtensionLoadError),
}

impl ScriptStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ScriptStatus::Loaded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptStatus::Loaded => "loaded",
            ScriptStatus::Unregistered { .. } => "unregistered",
            ScriptStatus::Failed(ExtensionLoadError::ScriptTimedOut { .. }) => "timed_out",
            ScriptStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub extension_id: String,
    pub script_url: String,
    pub status: ScriptStatus,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Normalized base path, when it could be derived.
    pub base_path: Option<String>,
    /// Whether the service returned a catalog at all (2xx).
    pub catalog_available: bool,
    /// Descriptors in the catalog, with or without a manifest.
    pub catalog_size: usize,
    /// One entry per manifest-bearing descriptor, in catalog order.
    pub outcomes: Vec<ScriptOutcome>,
    /// The error that degraded this pass to "no extensions", if any.
    pub aborted: Option<ExtensionLoadError>,
    pub elapsed: Duration,
}

impl LoadReport {
    pub(crate) fn aborted(error: ExtensionLoadError, base_path: Option<String>) -> Self {
        Self {
            base_path,
            aborted: Some(error),
            ..Self::default()
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn aborted_kind(&self) -> Option<ErrorKind> {
        self.aborted.as_ref().map(ExtensionLoadError::kind)
    }

    pub fn outcome(&self, extension_id: &str) -> Option<&ScriptOutcome> {
        self.outcomes.iter().find(|o| o.extension_id == extension_id)
    }

    pub fn loaded_count(&self) -> usize {
        self.count(|s| matches!(s, ScriptStatus::Loaded))
    }

    pub fn unregistered_count(&self) -> usize {
        self.count(|s| matches!(s, ScriptStatus::Unregistered { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, ScriptStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ScriptStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
