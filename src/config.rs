//! Host configuration for the extension subsystem.
//!
//! Sources, lowest precedence first: defaults, a YAML/JSON file, environment
//! variables, explicit builder calls.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `EXTENSION_HOST_BASE_URL` | extension service base URL |
//! | `EXTENSION_HOST_SCRIPT_TIMEOUT_SECS` | per-script load bound, `0` disables it (default 30) |
//! | `EXTENSION_HOST_HTTP_TIMEOUT_SECS` | HTTP request timeout (default 30) |
//! | `EXTENSION_HOST_PROXY_URL` | proxy for all extension traffic |

use crate::error::{Error, ErrorContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "EXTENSION_HOST_BASE_URL";
pub const ENV_SCRIPT_TIMEOUT_SECS: &str = "EXTENSION_HOST_SCRIPT_TIMEOUT_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "EXTENSION_HOST_HTTP_TIMEOUT_SECS";
pub const ENV_PROXY_URL: &str = "EXTENSION_HOST_PROXY_URL";

const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeouts are written in (possibly fractional) seconds in files and
/// environment variables and kept at full precision in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub base_url: Option<String>,
    /// `0` in a file or variable disables the per-script bound.
    #[serde(rename = "script_timeout_secs", with = "secs::optional")]
    script_timeout: Option<Duration>,
    #[serde(rename = "http_timeout_secs", with = "secs")]
    http_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            script_timeout: Some(DEFAULT_SCRIPT_TIMEOUT),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            proxy_url: None,
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Load a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::configuration_with_context(
                    "Unsupported configuration file type",
                    ErrorContext::new()
                        .with_field_path(path.to_string_lossy())
                        .with_details("expected .yaml, .yml or .json"),
                ))
            }
        };
        config.validate_from(&path.to_string_lossy())?;
        Ok(config)
    }

    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|s| !s.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_SCRIPT_TIMEOUT_SECS) {
            let timeout = parse_secs(ENV_SCRIPT_TIMEOUT_SECS, &raw)?;
            self.script_timeout = (!timeout.is_zero()).then_some(timeout);
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout = parse_secs(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }
        if let Some(proxy) = lookup(ENV_PROXY_URL).filter(|s| !s.trim().is_empty()) {
            self.proxy_url = Some(proxy);
        }
        self.validate_from("environment")?;
        Ok(self)
    }

    /// Rejects values no source may set: a zero HTTP timeout and a zero
    /// script bound (`None` is how the bound is disabled).
    pub fn validate(&self) -> Result<()> {
        self.validate_from("host_config")
    }

    fn validate_from(&self, source: &str) -> Result<()> {
        if self.http_timeout.is_zero() {
            return Err(invalid("http_timeout_secs", source, "HTTP timeout must be positive"));
        }
        if self.script_timeout.is_some_and(|t| t.is_zero()) {
            return Err(invalid(
                "script_timeout_secs",
                source,
                "script timeout must be positive; disable it instead",
            ));
        }
        Ok(())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// `None` disables the per-script bound.
    pub fn with_script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn script_timeout(&self) -> Option<Duration> {
        self.script_timeout
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

fn invalid(field: &str, source: &str, message: &str) -> Error {
    Error::configuration_with_context(
        message,
        ErrorContext::new().with_field_path(field).with_source(source),
    )
}

fn parse_secs(var: &str, raw: &str) -> Result<Duration> {
    let invalid_value = |details: String| {
        Error::configuration_with_context(
            format!("Invalid value '{}'", raw),
            ErrorContext::new()
                .with_field_path(var)
                .with_details(details)
                .with_source("environment"),
        )
    };
    let secs = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid_value(e.to_string()))?;
    Duration::try_from_secs_f64(secs).map_err(|e| invalid_value(e.to_string()))
}

/// Serde adapters between seconds (integer or fractional) and [`Duration`].
mod secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() == 0 {
            serializer.serialize_u64(value.as_secs())
        } else {
            serializer.serialize_f64(value.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }

    /// `0` stands for `None`.
    pub mod optional {
        use serde::{Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            super::serialize(&value.unwrap_or_default(), serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            let timeout = super::deserialize(deserializer)?;
            Ok((!timeout.is_zero()).then_some(timeout))
        }
    }
}
