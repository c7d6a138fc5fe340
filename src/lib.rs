//! # extension-host
//!
//! 运行时扩展发现、并行加载与放置注册表。
//!
//! Runtime discovery, loading and placement of UI extensions that a host
//! application did not compile itself.
//!
//! ## Overview
//!
//! At boot the host asks the extension service for its catalog, loads every
//! extension's entrypoint script concurrently and publishes the result into an
//! [`ExtensionRuntimeContext`]. UI regions then ask the [`PlacementRegistry`]
//! what renders at their slot, and a [`MountHost`] instantiates one extension's
//! custom element on demand.
//!
//! Extensions are an optional layer: an unreachable service, a broken catalog or
//! a failing script all degrade to "fewer extensions", never to a host error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use extension_host::{ExtensionLoader, ExtensionRuntimeContext, MountHost, Placement};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> extension_host::Result<()> {
//!     let context = Arc::new(ExtensionRuntimeContext::new());
//!     let loader = ExtensionLoader::new(context.clone())?;
//!     let report = loader.load_extensions("https://host.example/api").await;
//!     println!("{} extension(s) loaded", report.loaded_count());
//!
//!     for component in context.placement_registry().components_by_placement(Placement::Top) {
//!         println!("{} -> <{}>", component.plugin_id, component.tag_name);
//!     }
//!
//!     let mut host = MountHost::new(Placement::Center);
//!     host.activate("weather", &context);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`catalog`] | Catalog data model, fetch client and validation |
//! | [`loader`] | Boot pass: filter, namespace, concurrent script loading |
//! | [`runtime`] | Published state and asset namespaces |
//! | [`registry`] | Placement queries |
//! | [`mount`] | Mount host state machine |
//! | [`dom`] | Minimal document model |
//! | [`config`] | Host configuration |

pub mod catalog;
pub mod config;
pub mod dom;
pub mod loader;
pub mod mount;
pub mod registry;
pub mod runtime;

pub use catalog::{
    ComponentDescriptor, ErrorKind, ExtensionDescriptor, ExtensionLoadError, ExtensionManifest,
    ManifestClient, Placement,
};
pub use config::HostConfig;
pub use loader::{
    ExtensionLoader, ExtensionLoaderBuilder, LoadReport, LoadResult, ScriptEvaluator,
    ScriptLoader, ScriptStatus,
};
pub use mount::{MountHost, MountState};
pub use registry::{PlacementRegistry, ResolvedExtensionComponent};
pub use runtime::{AssetNamespace, ExtensionRuntimeContext};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
