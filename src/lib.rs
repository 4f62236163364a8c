//! Path-addressed SCIM 2.0 patch and query engine for Rust.
//!
//! Reads and modifies SCIM resources held as `serde_json` objects through
//! attribute paths with value filters, following RFC 7644 PATCH semantics,
//! and derives RFC 7643 attribute definitions from registered types.
//!
//! # Core Components
//!
//! - [`Path`] - Parsed attribute paths (`addresses[type eq "work"].region`)
//! - [`Filter`] / [`Evaluator`] - SCIM filter expressions and their evaluation
//! - [`node`] - The traversal engine: gather, remove, add, replace
//! - [`GenericResource`] - Typed, path-addressed access to one resource
//! - [`PatchRequest`] - Validated PATCH messages applied to a resource
//! - [`SchemaFactory`] - Attribute definitions derived from type descriptors
//!
//! # Quick Start
//!
//! ```rust
//! use scim_patch::GenericResource;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut user = GenericResource::try_from(json!({
//!     "userName": "bjensen",
//!     "addresses": [
//!         {"type": "work", "region": "CA"},
//!         {"type": "home", "region": "CA"}
//!     ]
//! }))?;
//!
//! user.replace(r#"addresses[type eq "home"].region"#, "TX".to_string())?;
//! assert_eq!(user.string_list("addresses.region")?, vec!["CA", "TX"]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod node;
pub mod patch;
pub mod path;
pub mod resource;
pub mod schema;

// Re-export commonly used types for convenience
pub use config::{DatePrecision, EngineConfig};
pub use error::{ScimError, ScimResult};
pub use filter::{ComparisonOperator, Evaluator, Filter};
pub use node::Operation;
pub use patch::{PatchOp, PatchOperation, PatchRequest};
pub use path::{IntoPath, Path, PathElement};
pub use resource::{Binary, ContentVersion, GenericResource, Meta, NodeValue, Reference};
pub use schema::{AttributeDefinition, Schema, SchemaFactory, ScimType, TypeDescriptor};
