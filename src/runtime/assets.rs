//! Per-extension asset namespaces.

use crate::catalog::ExtensionLoadError;
use std::fmt;
use url::Url;

/// Normalizes the extension service base URL: absolute http(s), no trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, ExtensionLoadError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| {
        ExtensionLoadError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
            hint: None,
        }
        .with_hint("Use an absolute URL such as https://host.example/api")
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ExtensionLoadError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", other),
                hint: Some("Only http and https extension services are supported".to_string()),
            })
        }
    }

    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(ExtensionLoadError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL has no host".to_string(),
            hint: None,
        });
    }

    let mut normalized = parsed;
    normalized.set_query(None);
    normalized.set_fragment(None);
    Ok(normalized.as_str().trim_end_matches('/').to_string())
}

/// Base URL under which one extension's static assets resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetNamespace(String);

impl AssetNamespace {
    /// `<base>/v2/extensions/<id>/assets`. `base` must already be normalized.
    ///
    /// The id is percent-encoded as a single path segment, so `/`, `?` or `#`
    /// in an id cannot move the namespace elsewhere.
    pub fn for_extension(base_url: &str, extension_id: &str) -> Self {
        let joined = Url::parse(base_url).ok().and_then(|mut url| {
            url.path_segments_mut()
                .ok()?
                .pop_if_empty()
                .extend(["v2", "extensions", extension_id, "assets"]);
            Some(String::from(url))
        });
        Self(joined.unwrap_or_else(|| format!("{}/v2/extensions/{}/assets", base_url, extension_id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a path relative to this namespace (`./img/a.png`, `/img/a.png`
    /// and `img/a.png` all land on `<namespace>/img/a.png`).
    pub fn resolve(&self, relative: &str) -> String {
        let relative = relative.trim();
        let relative = relative.strip_prefix("./").unwrap_or(relative);
        let relative = relative.trim_start_matches('/');
        format!("{}/{}", self.0, relative)
    }
}

impl fmt::Display for AssetNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetNamespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
