//! Generic SCIM resources and the typed values read from them.
//!
//! This module wraps the path engine in a resource-shaped API. Resources
//! are plain JSON objects; no schema is required to read or write them.
//!
//! # Key Components
//!
//! * [`GenericResource`] - A JSON object with path-addressed typed access
//! * [`NodeValue`] - Conversion between tree nodes and SCIM simple types
//! * [`Meta`] - The typed `meta` complex attribute
//! * [`Reference`] - Absolute or relative URI values
//! * [`ContentVersion`] - Versions derived from resource content

pub mod generic;
pub mod meta;
pub mod reference;
pub mod scalar;
pub mod version;

pub use generic::GenericResource;
pub use meta::Meta;
pub use reference::Reference;
pub use scalar::{Binary, NodeValue};
pub use version::ContentVersion;
