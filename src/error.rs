//! Error types for SCIM path, filter, patch and schema operations.
//!
//! Every fallible entry point of this crate reports through [`ScimError`].
//! Each variant that a SCIM service provider would surface to its client
//! carries a stable `scimType` code (RFC 7644 Section 3.12), available
//! through [`ScimError::scim_type`].

/// Main error type for the patch engine, the generic resource view and
/// the schema factory.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// The path addressed a value that cannot be operated on
    /// (scalar where a complex or multi-valued value is required, or an
    /// intermediate value filter that matched nothing)
    #[error("Invalid target: {message}")]
    InvalidTarget { message: String },

    /// A value-filtered replace did not match any value
    #[error("No target: {message}")]
    NoTarget { message: String },

    /// A leaf value could not be decoded with the expected encoding
    #[error("Value at path '{path}' is not a valid {encoding} encoded value")]
    InvalidValueEncoding { path: String, encoding: String },

    /// A value has the wrong shape for the requested operation or type
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    /// The attribute path expression could not be parsed
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// The filter expression could not be parsed or evaluated
    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    /// The PATCH request body is structurally invalid
    #[error("Invalid syntax: {message}")]
    InvalidSyntax { message: String },

    /// Attribute derivation found a type nesting itself
    #[error("Cycle detected in schema: type '{type_name}' nests itself")]
    SchemaCycle { type_name: String },

    /// Declared field shape and multi-value annotation disagree
    #[error("Schema configuration mismatch on '{type_name}.{field}': {message}")]
    SchemaMismatch {
        type_name: String,
        field: String,
        message: String,
    },

    /// A complex field refers to a type that was never registered
    #[error("Schema type not registered: {type_name}")]
    SchemaNotFound { type_name: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScimError {
    /// Create an invalid target error
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: message.into(),
        }
    }

    /// Create a no target error
    pub fn no_target(message: impl Into<String>) -> Self {
        Self::NoTarget {
            message: message.into(),
        }
    }

    /// Create an invalid value encoding error
    pub fn invalid_encoding(path: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self::InvalidValueEncoding {
            path: path.into(),
            encoding: encoding.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Create a schema cycle error
    pub fn schema_cycle(type_name: impl Into<String>) -> Self {
        Self::SchemaCycle {
            type_name: type_name.into(),
        }
    }

    /// Create a schema configuration mismatch error
    pub fn schema_mismatch(
        type_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            type_name: type_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(type_name: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            type_name: type_name.into(),
        }
    }

    /// The RFC 7644 `scimType` code a service provider should return for
    /// this error, if it is a client-facing one.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Self::InvalidTarget { .. } | Self::NoTarget { .. } => Some("noTarget"),
            Self::InvalidValueEncoding { .. } | Self::InvalidValue { .. } => Some("invalidValue"),
            Self::InvalidPath { .. } => Some("invalidPath"),
            Self::InvalidFilter { .. } => Some("invalidFilter"),
            Self::InvalidSyntax { .. } => Some("invalidSyntax"),
            Self::SchemaCycle { .. }
            | Self::SchemaMismatch { .. }
            | Self::SchemaNotFound { .. }
            | Self::Json(_) => None,
        }
    }
}

// Result type alias for convenience
pub type ScimResult<T> = Result<T, ScimError>;
