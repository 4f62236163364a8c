//! Derivation of attribute definitions from type descriptors.
//!
//! Rust types describe their SCIM shape through a [`TypeDescriptor`]: one
//! [`FieldDescriptor`] per attribute, carrying the attribute's
//! characteristics and either a simple data type or the name of another
//! registered type. [`SchemaFactory`] holds the registered descriptors and
//! turns them into [`AttributeDefinition`] trees and [`Schema`]s.
//!
//! Derivation walks nested types depth-first with an explicit stack of the
//! types being derived. A type reached again while it is still on the
//! stack is a cycle, with one exception: the attribute-definition type
//! itself describes `subAttributes` in terms of itself, so it may nest
//! exactly once.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::schema::{
//!     AttributeType, FieldDescriptor, FieldKind, SchemaFactory, TypeDescriptor,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut factory = SchemaFactory::new();
//! factory.register_descriptor(
//!     TypeDescriptor::new("Email")
//!         .field(FieldDescriptor::simple("value", AttributeType::String))
//!         .field(FieldDescriptor::simple("primary", AttributeType::Boolean)),
//! );
//! factory.register_descriptor(
//!     TypeDescriptor::new("User")
//!         .schema_id("urn:ietf:params:scim:schemas:core:2.0:User")
//!         .field(FieldDescriptor::simple("userName", AttributeType::String).required(true))
//!         .field(FieldDescriptor::multi_valued("emails", FieldKind::complex("Email"))),
//! );
//!
//! let schema = factory.schema("User")?;
//! assert_eq!(schema.id, "urn:ietf:params:scim:schemas:core:2.0:User");
//! assert_eq!(schema.attributes[1].sub_attributes.len(), 2);
//! # Ok(())
//! # }
//! ```

use super::enforce_urn;
use super::types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema, Uniqueness};
use crate::error::{ScimError, ScimResult};
use log::{debug, trace};
use std::collections::HashMap;

/// Type name under which the attribute-definition descriptor is registered.
pub const ATTRIBUTE_DEFINITION_TYPE: &str = "AttributeDefinition";

/// The shape of a field, or of the elements of a multi-valued field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A value of a simple SCIM type
    Simple(AttributeType),
    /// A value of another registered type, derived as a complex attribute
    Complex(String),
}

impl FieldKind {
    pub fn complex(type_name: impl Into<String>) -> Self {
        Self::Complex(type_name.into())
    }
}

/// One attribute of a [`TypeDescriptor`].
///
/// `collection` says whether the Rust field holds many values;
/// `multi_value_type` is the declared element type of those values. The
/// two must agree: a collection without an element type, or an element
/// type on a single-valued field, is a configuration mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub collection: bool,
    pub multi_value_type: Option<FieldKind>,
    pub description: Option<String>,
    pub required: bool,
    pub case_exact: bool,
    pub mutability: Mutability,
    pub returned: Returned,
    pub uniqueness: Uniqueness,
    pub canonical_values: Vec<String>,
    pub reference_types: Vec<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            collection: false,
            multi_value_type: None,
            description: None,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
        }
    }

    /// A single-valued field of a simple type.
    pub fn simple(name: impl Into<String>, data_type: AttributeType) -> Self {
        Self::new(name, FieldKind::Simple(data_type))
    }

    /// A single-valued field of another registered type.
    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::complex(type_name))
    }

    /// A collection field whose elements are of `element` type.
    pub fn multi_valued(name: impl Into<String>, element: FieldKind) -> Self {
        let mut field = Self::new(name, element.clone());
        field.collection = true;
        field.multi_value_type = Some(element);
        field
    }

    pub fn collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    pub fn multi_value_type(mut self, element: Option<FieldKind>) -> Self {
        self.multi_value_type = element;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    pub fn mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = mutability;
        self
    }

    pub fn returned(mut self, returned: Returned) -> Self {
        self.returned = returned;
        self
    }

    pub fn uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    pub fn canonical_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.canonical_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn reference_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// The SCIM description of a Rust type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub schema_id: Option<String>,
    pub schema_name: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_id: None,
            schema_name: None,
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn schema_id(mut self, id: impl Into<String>) -> Self {
        self.schema_id = Some(id.into());
        self
    }

    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Implemented by Rust types that publish a SCIM description of themselves.
pub trait ScimType {
    fn descriptor() -> TypeDescriptor;
}

/// Registry of type descriptors deriving attribute definitions and schemas.
#[derive(Debug, Clone)]
pub struct SchemaFactory {
    types: HashMap<String, TypeDescriptor>,
}

impl Default for SchemaFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaFactory {
    /// A factory knowing the attribute-definition and `meta` types.
    pub fn new() -> Self {
        let mut factory = Self {
            types: HashMap::new(),
        };
        factory.register::<AttributeDefinition>();
        factory.register::<crate::resource::Meta>();
        factory
    }

    /// Register the descriptor `T` publishes.
    pub fn register<T: ScimType>(&mut self) -> &mut Self {
        self.register_descriptor(T::descriptor())
    }

    /// Register `descriptor`, replacing any earlier one of the same name.
    pub fn register_descriptor(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        debug!(
            "Registering SCIM type '{}' with {} field(s)",
            descriptor.name,
            descriptor.fields.len()
        );
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Derive the attribute definitions of a registered type.
    ///
    /// # Errors
    /// * [`ScimError::SchemaNotFound`] - the type, or a complex type it
    ///   refers to, is not registered
    /// * [`ScimError::SchemaCycle`] - a type nests itself
    /// * [`ScimError::SchemaMismatch`] - a field's collection flag and
    ///   element type disagree
    pub fn attributes(&self, type_name: &str) -> ScimResult<Vec<AttributeDefinition>> {
        let mut deriving = Vec::new();
        self.derive(type_name, &mut deriving)
    }

    /// Build the schema of a registered type.
    ///
    /// The id is the descriptor's schema id, or the type name, prefixed
    /// with `urn:` unless it already is a URN.
    pub fn schema(&self, type_name: &str) -> ScimResult<Schema> {
        let descriptor = self
            .types
            .get(type_name)
            .ok_or_else(|| ScimError::schema_not_found(type_name))?;
        let id = enforce_urn(descriptor.schema_id.as_deref().unwrap_or(&descriptor.name));
        Ok(Schema {
            id,
            name: descriptor
                .schema_name
                .clone()
                .unwrap_or_else(|| descriptor.name.clone()),
            description: descriptor.description.clone(),
            attributes: self.attributes(type_name)?,
        })
    }

    fn derive(
        &self,
        type_name: &str,
        deriving: &mut Vec<String>,
    ) -> ScimResult<Vec<AttributeDefinition>> {
        let descriptor = self
            .types
            .get(type_name)
            .ok_or_else(|| ScimError::schema_not_found(type_name))?;

        let depth = deriving.iter().filter(|name| *name == type_name).count();
        if depth > 0 {
            if type_name != ATTRIBUTE_DEFINITION_TYPE {
                debug!("Type '{type_name}' nests itself via {deriving:?}");
                return Err(ScimError::schema_cycle(type_name));
            }
            if depth > 1 {
                return Ok(Vec::new());
            }
        }

        trace!("Deriving attributes of '{type_name}'");
        deriving.push(type_name.to_owned());
        let attributes: ScimResult<Vec<_>> = descriptor
            .fields
            .iter()
            .map(|field| self.derive_field(&descriptor.name, field, deriving))
            .collect();
        deriving.pop();
        attributes
    }

    fn derive_field(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
        deriving: &mut Vec<String>,
    ) -> ScimResult<AttributeDefinition> {
        let kind = match (field.collection, &field.multi_value_type) {
            (true, Some(element)) => element,
            (false, None) => &field.kind,
            (true, None) => {
                return Err(ScimError::schema_mismatch(
                    type_name,
                    &field.name,
                    "collection field has no multi-value element type",
                ));
            }
            (false, Some(_)) => {
                return Err(ScimError::schema_mismatch(
                    type_name,
                    &field.name,
                    "multi-value element type given for a single-valued field",
                ));
            }
        };

        let (data_type, sub_attributes) = match kind {
            FieldKind::Simple(data_type) => (*data_type, Vec::new()),
            FieldKind::Complex(nested) => (AttributeType::Complex, self.derive(nested, deriving)?),
        };

        Ok(AttributeDefinition {
            name: field.name.clone(),
            description: field.description.clone(),
            data_type,
            multi_valued: field.collection,
            required: field.required,
            case_exact: field.case_exact,
            mutability: field.mutability,
            returned: field.returned,
            uniqueness: field.uniqueness,
            canonical_values: field.canonical_values.clone(),
            reference_types: field.reference_types.clone(),
            sub_attributes,
        })
    }
}

impl ScimType for AttributeDefinition {
    fn descriptor() -> TypeDescriptor {
        let read_only = |field: FieldDescriptor| field.mutability(Mutability::ReadOnly);
        TypeDescriptor::new(ATTRIBUTE_DEFINITION_TYPE)
            .schema_id("urn:ietf:params:scim:schemas:core:2.0:Attribute")
            .schema_name("Attribute")
            .description("Attribute definition of a SCIM schema")
            .field(read_only(
                FieldDescriptor::simple("name", AttributeType::String)
                    .description("The attribute's name.")
                    .required(true),
            ))
            .field(read_only(
                FieldDescriptor::simple("type", AttributeType::String)
                    .description("The attribute's data type.")
                    .required(true)
                    .canonical_values([
                        "string", "boolean", "decimal", "integer", "dateTime", "binary",
                        "reference", "complex",
                    ]),
            ))
            .field(read_only(
                FieldDescriptor::simple("required", AttributeType::Boolean)
                    .description("A Boolean value that specifies if the attribute is required.")
                    .required(true),
            ))
            .field(read_only(
                FieldDescriptor::simple("caseExact", AttributeType::Boolean).description(
                    "A Boolean value that specifies if the String attribute is case sensitive.",
                ),
            ))
            .field(read_only(
                FieldDescriptor::simple("multiValued", AttributeType::Boolean)
                    .description("Boolean value indicating the attribute's plurality.")
                    .required(true),
            ))
            .field(read_only(
                FieldDescriptor::simple("description", AttributeType::String)
                    .description("The attribute's human readable description."),
            ))
            .field(read_only(
                FieldDescriptor::multi_valued(
                    "canonicalValues",
                    FieldKind::Simple(AttributeType::String),
                )
                .description("A collection of suggested canonical values that MAY be used."),
            ))
            .field(read_only(
                FieldDescriptor::multi_valued(
                    "referenceTypes",
                    FieldKind::Simple(AttributeType::String),
                )
                .description(
                    "A multi-valued array of JSON strings that indicate the SCIM resource types that may be referenced.",
                ),
            ))
            .field(read_only(
                FieldDescriptor::multi_valued(
                    "subAttributes",
                    FieldKind::complex(ATTRIBUTE_DEFINITION_TYPE),
                )
                .description(
                    "When an attribute is of type \"complex\", \"subAttributes\" defines set of sub-attributes.",
                ),
            ))
            .field(read_only(
                FieldDescriptor::simple("uniqueness", AttributeType::String)
                    .description(
                        "A single keyword value that specifies how the service provider enforces uniqueness of attribute values.",
                    )
                    .canonical_values(["none", "server", "global"]),
            ))
            .field(read_only(
                FieldDescriptor::simple("returned", AttributeType::String)
                    .description(
                        "A single keyword that indicates when an attribute and associated values are returned in response to a GET request or in response to a PUT, POST, or PATCH request.",
                    )
                    .required(true)
                    .canonical_values(["always", "never", "default", "request"]),
            ))
            .field(read_only(
                FieldDescriptor::simple("mutability", AttributeType::String)
                    .description(
                        "A single keyword indicating the circumstances under which the value of the attribute can be (re)defined.",
                    )
                    .required(true)
                    .canonical_values(["readOnly", "readWrite", "immutable", "writeOnly"]),
            ))
    }
}
