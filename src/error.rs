use crate::catalog::ExtensionLoadError;
use crate::dom::DefineError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "EXTENSION_HOST_HTTP_TIMEOUT_SECS")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "host_config", "extension_loader")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the extension host.
///
/// Loading itself never surfaces errors to the host (see
/// [`ExtensionLoader::load_extensions`](crate::loader::ExtensionLoader::load_extensions));
/// this type covers setup (configuration, client construction) and the
/// fallible helpers around it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Extension loading error: {0}")]
    Load(#[from] ExtensionLoadError),

    #[error("Custom element error: {0}")]
    Define(#[from] DefineError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::Runtime {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered() {
        let err = Error::configuration_with_context(
            "Invalid value 'x'",
            ErrorContext::new()
                .with_field_path("EXTENSION_HOST_HTTP_TIMEOUT_SECS")
                .with_source("host_config"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value 'x' (field: EXTENSION_HOST_HTTP_TIMEOUT_SECS, source: host_config)"
        );
    }

    #[test]
    fn test_load_error_converts() {
        let err: Error = ExtensionLoadError::AlreadyLoaded.into();
        assert!(matches!(err, Error::Load(ExtensionLoadError::AlreadyLoaded)));
        assert!(err.context().is_none());
    }
}
