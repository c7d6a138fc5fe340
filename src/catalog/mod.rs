//! 扩展目录层：远程扩展清单的数据模型、获取与校验。
//!
//! # Extension Catalog
//!
//! The catalog is the list of extensions the extension service knows about. This
//! module owns its data model, the client that fetches it, and declaration-level
//! validation.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | `ExtensionDescriptor`, `ExtensionManifest`, `ComponentDescriptor`, `Placement` |
//! | [`client`] | `ManifestClient`: uncached catalog fetch |
//! | [`error`] | `ExtensionLoadError` and its [`ErrorKind`] taxonomy |

pub mod client;
pub mod error;
pub mod model;

pub use client::ManifestClient;
pub use error::{ErrorKind, ExtensionLoadError};
pub use model::{
    validate_catalog, ComponentDescriptor, ExtensionDescriptor, ExtensionManifest, Placement,
    ValidationIssue,
};
