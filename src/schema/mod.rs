//! Schema definitions and attribute derivation for SCIM resources.
//!
//! This module provides the RFC 7643 attribute-definition model and the
//! factory that derives definitions from registered type descriptors.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with attributes and metadata
//! - [`AttributeDefinition`] - Individual attribute specifications and constraints
//! - [`SchemaFactory`] - Registry deriving definitions from [`TypeDescriptor`]s
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::schema::{SchemaFactory, ATTRIBUTE_DEFINITION_TYPE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = SchemaFactory::new();
//! let attribute_schema = factory.schema(ATTRIBUTE_DEFINITION_TYPE)?;
//! assert_eq!(attribute_schema.id, "urn:ietf:params:scim:schemas:core:2.0:Attribute");
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod types;


// Re-export the main types for convenience
pub use factory::{
    ATTRIBUTE_DEFINITION_TYPE, FieldDescriptor, FieldKind, SchemaFactory, ScimType,
    TypeDescriptor,
};
pub use types::{
    AttributeDefinition, AttributeDefinitionBuilder, AttributeType, Mutability, Returned,
    Schema, Uniqueness,
};

/// Whether `value` looks like a schema URN: it starts with `urn:`
/// (ignoring case) and has something after it.
pub fn is_namespace(value: &str) -> bool {
    value.len() > 4
        && value
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("urn:"))
}

/// `value` unchanged if it is a schema URN, otherwise prefixed with `urn:`.
pub fn enforce_urn(value: &str) -> String {
    if is_namespace(value) {
        value.to_owned()
    } else {
        format!("urn:{value}")
    }
}
