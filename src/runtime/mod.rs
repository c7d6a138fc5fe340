//! Process-wide extension state and the asset namespaces derived from it.

pub mod assets;
pub mod context;

pub use assets::{normalize_base_url, AssetNamespace};
pub use context::ExtensionRuntimeContext;
