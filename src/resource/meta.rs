//! Meta value for SCIM resource metadata.
//!
//! This module provides a typed view of the SCIM `meta` complex attribute
//! (RFC 7643 Section 3.1): resource type, timestamps, location and version.
//! Every field is optional, since a resource under construction or a
//! partial PATCH value may carry only some of them.

use crate::error::{ScimError, ScimResult};
use crate::schema::{AttributeType, FieldDescriptor, Mutability, ScimType, TypeDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// SCIM resource metadata.
///
/// ## Examples
///
/// ```rust
/// use scim_patch::resource::Meta;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let meta = Meta::new_for_creation("User")
///         .with_location("https://example.com/Users/123")?
///         .with_version("W/\"123-456\"")?;
///     assert_eq!(meta.resource_type.as_deref(), Some("User"));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Meta {
    /// Create a Meta carrying only the resource type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            ..Self::default()
        }
    }

    /// Create a Meta for a new resource with current timestamp.
    ///
    /// Sets both created and last_modified to the current time.
    pub fn new_for_creation(resource_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            created: Some(now),
            last_modified: Some(now),
            ..Self::new(resource_type)
        }
    }

    /// Create a new Meta with updated last modified timestamp.
    pub fn with_updated_timestamp(&self) -> Self {
        Self {
            last_modified: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Create a new Meta with a specific location.
    ///
    /// The location must be an absolute http(s) URI.
    pub fn with_location(mut self, location: impl Into<String>) -> ScimResult<Self> {
        let location = location.into();
        Self::validate_location(&location)?;
        self.location = Some(location);
        Ok(self)
    }

    /// Create a new Meta with a specific version.
    ///
    /// The version must be an ETag, weak (`W/"..."`) or strong (`"..."`).
    pub fn with_version(mut self, version: impl Into<String>) -> ScimResult<Self> {
        let version = version.into();
        Self::validate_version(&version)?;
        self.version = Some(version);
        Ok(self)
    }

    /// Generate a location URI for the resource.
    ///
    /// Creates a standard SCIM location URI based on the base URL, resource type,
    /// and resource ID.
    pub fn generate_location(base_url: &str, resource_type: &str, resource_id: &str) -> String {
        format!(
            "{}/{}s/{}",
            base_url.trim_end_matches('/'),
            resource_type,
            resource_id
        )
    }

    fn validate_location(location: &str) -> ScimResult<()> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ScimError::invalid_value(format!(
                "Meta location '{location}' is not an absolute http(s) URI"
            ))),
        }
    }

    fn validate_version(version: &str) -> ScimResult<()> {
        // Version should follow ETag format: W/"..." or "..."
        let opaque = version.strip_prefix("W/").unwrap_or(version);
        if opaque.len() < 2 || !opaque.starts_with('"') || !opaque.ends_with('"') {
            return Err(ScimError::invalid_value(format!(
                "Meta version '{version}' is not an ETag"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: &Option<DateTime<Utc>>| d.map(|d| d.to_rfc3339()).unwrap_or_default();
        write!(
            f,
            "Meta(resourceType={}, created={}, lastModified={})",
            self.resource_type.as_deref().unwrap_or_default(),
            date(&self.created),
            date(&self.last_modified)
        )
    }
}

impl ScimType for Meta {
    fn descriptor() -> TypeDescriptor {
        let read_only = |name: &str, data_type: AttributeType| {
            FieldDescriptor::simple(name, data_type).mutability(Mutability::ReadOnly)
        };
        TypeDescriptor::new("Meta")
            .description("A complex attribute containing resource metadata.")
            .field(
                read_only("resourceType", AttributeType::String)
                    .description("The name of the resource type of the resource.")
                    .case_exact(true),
            )
            .field(
                read_only("created", AttributeType::DateTime)
                    .description("The DateTime that the resource was added to the service provider."),
            )
            .field(
                read_only("lastModified", AttributeType::DateTime)
                    .description("The most recent DateTime that the details of this resource were updated at the service provider."),
            )
            .field(
                read_only("location", AttributeType::Reference)
                    .description("The URI of the resource being returned.")
                    .case_exact(true)
                    .reference_types(["uri"]),
            )
            .field(
                read_only("version", AttributeType::String)
                    .description("The version of the resource being returned.")
                    .case_exact(true),
            )
    }
}
