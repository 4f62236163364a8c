//! Core schema type definitions for SCIM resources.
//!
//! This module contains the data structures that describe SCIM schemas and
//! attribute definitions, and their characteristics as specified in RFC 7643.

use crate::path::Path;
use serde::{Deserialize, Serialize};

/// A schema resource: the attributes of a resource type or of an
/// extension to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier (URN)
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// List of attribute definitions
    pub attributes: Vec<AttributeDefinition>,
}

/// One attribute of a schema with its RFC 7643 characteristics.
///
/// Serializes in the wire form of the `attributes` of a schema resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Whether this attribute can have multiple values
    #[serde(rename = "multiValued", default)]
    pub multi_valued: bool,
    /// Whether this attribute is required
    #[serde(default)]
    pub required: bool,
    /// Whether string comparison is case-sensitive
    #[serde(rename = "caseExact", default)]
    pub case_exact: bool,
    /// Mutability characteristics
    #[serde(default)]
    pub mutability: Mutability,
    /// How the attribute is returned in responses
    #[serde(default)]
    pub returned: Returned,
    /// Uniqueness constraints
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Allowed values for string attributes
    #[serde(rename = "canonicalValues", default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_values: Vec<String>,
    /// Resource types a reference attribute may point at
    #[serde(rename = "referenceTypes", default, skip_serializing_if = "Vec::is_empty")]
    pub reference_types: Vec<String>,
    /// Sub-attributes for complex types
    #[serde(rename = "subAttributes", default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            data_type: AttributeType::String,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
        }
    }
}

impl AttributeDefinition {
    /// Start building a definition named `name` with the RFC 7643 defaults.
    pub fn builder(name: impl Into<String>) -> AttributeDefinitionBuilder {
        AttributeDefinitionBuilder::new(name)
    }

    /// Resolve `path` against `definitions`, descending into sub-attributes
    /// one element at a time. Names match ignoring ASCII case; the path's
    /// namespace and value filters are ignored.
    pub fn find<'a>(
        definitions: &'a [AttributeDefinition],
        path: &Path,
    ) -> Option<&'a AttributeDefinition> {
        let mut current = definitions;
        let mut found = None;
        for element in path {
            let definition = current
                .iter()
                .find(|definition| definition.name.eq_ignore_ascii_case(element.attribute()))?;
            current = &definition.sub_attributes;
            found = Some(definition);
        }
        found
    }
}

/// Fluent builder for [`AttributeDefinition`].
///
/// # Examples
///
/// ```rust
/// use scim_patch::schema::{AttributeDefinition, AttributeType, Mutability};
///
/// let emails = AttributeDefinition::builder("emails")
///     .data_type(AttributeType::Complex)
///     .multi_valued(true)
///     .sub_attribute(AttributeDefinition::builder("value").build())
///     .sub_attribute(
///         AttributeDefinition::builder("type")
///             .canonical_values(["work", "home", "other"])
///             .build(),
///     )
///     .build();
/// assert_eq!(emails.sub_attributes.len(), 2);
/// assert_eq!(emails.mutability, Mutability::ReadWrite);
/// ```
#[derive(Debug, Clone)]
pub struct AttributeDefinitionBuilder {
    definition: AttributeDefinition,
}

impl AttributeDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: AttributeDefinition {
                name: name.into(),
                ..AttributeDefinition::default()
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    pub fn data_type(mut self, data_type: AttributeType) -> Self {
        self.definition.data_type = data_type;
        self
    }

    pub fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.definition.multi_valued = multi_valued;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.definition.required = required;
        self
    }

    pub fn case_exact(mut self, case_exact: bool) -> Self {
        self.definition.case_exact = case_exact;
        self
    }

    pub fn mutability(mut self, mutability: Mutability) -> Self {
        self.definition.mutability = mutability;
        self
    }

    pub fn returned(mut self, returned: Returned) -> Self {
        self.definition.returned = returned;
        self
    }

    pub fn uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.definition.uniqueness = uniqueness;
        self
    }

    pub fn canonical_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.canonical_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn reference_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.reference_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Add one sub-attribute. Does not change the data type.
    pub fn sub_attribute(mut self, sub_attribute: AttributeDefinition) -> Self {
        self.definition.sub_attributes.push(sub_attribute);
        self
    }

    pub fn sub_attributes(mut self, sub_attributes: Vec<AttributeDefinition>) -> Self {
        self.definition.sub_attributes = sub_attributes;
        self
    }

    pub fn build(self) -> AttributeDefinition {
        self.definition
    }
}

/// The `type` characteristic: one of the RFC 7643 Section 2.3 data types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    #[default]
    String,
    Boolean,
    Decimal,
    Integer,
    /// `xsd:dateTime` text, e.g. `2008-01-23T04:56:22Z`
    DateTime,
    /// Base64 text
    Binary,
    /// A URI, possibly relative, often naming another resource
    Reference,
    /// Has sub-attributes but no value of its own
    Complex,
}

/// The `mutability` characteristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    ReadOnly,
    #[default]
    ReadWrite,
    /// Settable once, by the request that creates the resource
    Immutable,
    /// Settable but never returned, e.g. `password`
    WriteOnly,
}

/// The `returned` characteristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    #[default]
    Default,
    Always,
    Never,
    /// Only when named in the `attributes` request parameter
    Request,
}

/// The `uniqueness` characteristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    #[default]
    None,
    /// Unique within one service provider, e.g. `userName`
    Server,
    Global,
}
