//! Extension loading error types

use std::time::Duration;

/// Coarse classification of a load error, used by callers and tests that care
/// about *which* kind of failure was absorbed rather than its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The catalog could not be fetched at all (network / transport failure).
    CatalogUnavailable,
    /// The catalog (or the base URL used to reach it) could not be interpreted.
    MalformedCatalog,
    /// One extension's entrypoint failed; siblings are unaffected.
    ExtensionLoadFailure,
    /// The loader was used outside its one-boot-per-context contract.
    Lifecycle,
}

/// Extension loading error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtensionLoadError {
    #[error("Extension catalog unavailable at {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("Malformed extension catalog from {url}: {reason}")]
    MalformedCatalog { url: String, reason: String },

    #[error("Invalid extension service base URL '{url}': {reason}{}", .hint.as_ref().map(|h| format!("\n Hint: {}", h)).unwrap_or_default())]
    InvalidBaseUrl {
        url: String,
        reason: String,
        hint: Option<String>,
    },

    #[error("Entrypoint for extension '{extension_id}' failed to load from {url}: {reason}")]
    ScriptFailed {
        extension_id: String,
        url: String,
        reason: String,
    },

    #[error("Entrypoint for extension '{extension_id}' did not settle within {timeout:?} ({url})")]
    ScriptTimedOut {
        extension_id: String,
        url: String,
        timeout: Duration,
    },

    #[error("Extensions were already loaded into this runtime context")]
    AlreadyLoaded,

    #[error("Internal extension loader error: {0}")]
    Internal(String),
}

impl ExtensionLoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtensionLoadError::CatalogUnavailable { .. } => ErrorKind::CatalogUnavailable,
            ExtensionLoadError::MalformedCatalog { .. }
            | ExtensionLoadError::InvalidBaseUrl { .. } => ErrorKind::MalformedCatalog,
            ExtensionLoadError::ScriptFailed { .. } | ExtensionLoadError::ScriptTimedOut { .. } => {
                ErrorKind::ExtensionLoadFailure
            }
            ExtensionLoadError::AlreadyLoaded | ExtensionLoadError::Internal(_) => {
                ErrorKind::Lifecycle
            }
        }
    }

    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint_val = Some(hint.into());
        if let ExtensionLoadError::InvalidBaseUrl { ref mut hint, .. } = self {
            *hint = hint_val;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let unavailable = ExtensionLoadError::CatalogUnavailable {
            url: "http://x/v2/extensions/".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(unavailable.kind(), ErrorKind::CatalogUnavailable);

        let bad_url = ExtensionLoadError::InvalidBaseUrl {
            url: "::".into(),
            reason: "relative URL without a base".into(),
            hint: None,
        };
        assert_eq!(bad_url.kind(), ErrorKind::MalformedCatalog);

        let timed_out = ExtensionLoadError::ScriptTimedOut {
            extension_id: "a".into(),
            url: "http://x/a.js".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timed_out.kind(), ErrorKind::ExtensionLoadFailure);
    }

    #[test]
    fn test_hint_is_rendered() {
        let err = ExtensionLoadError::InvalidBaseUrl {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
            hint: None,
        }
        .with_hint("Use an absolute http(s) URL");
        assert!(err.to_string().contains("Hint: Use an absolute http(s) URL"));
    }
}
