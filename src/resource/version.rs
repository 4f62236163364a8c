//! Content-derived resource versions.
//!
//! A [`ContentVersion`] is an opaque identifier computed from the serialized
//! form of a resource, so two resources with the same content always carry
//! the same version. It renders as a weak HTTP ETag (`W/"..."`), the form
//! SCIM uses for `meta.version`.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::resource::ContentVersion;
//!
//! let version = ContentVersion::from_content(br#"{"id":"123","userName":"bjensen"}"#);
//! let etag = version.to_string();
//! assert!(etag.starts_with("W/\""));
//!
//! let parsed: ContentVersion = etag.parse().unwrap();
//! assert_eq!(parsed, version);
//! ```

use crate::error::{ScimError, ScimResult};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Opaque version identifier of a resource's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentVersion {
    opaque: String,
}

impl ContentVersion {
    /// Create a version from resource content.
    ///
    /// The version is the base64 encoding of the first 8 bytes of the
    /// content's SHA-256 digest.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        Self {
            opaque: BASE64.encode(&hash[..8]),
        }
    }

    /// Wrap an already computed opaque identifier.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            opaque: hash.into(),
        }
    }

    /// The opaque identifier without ETag decoration.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }

    /// Whether `etag` (weak or strong) names this version.
    pub fn matches(&self, etag: &str) -> bool {
        etag.parse::<ContentVersion>()
            .is_ok_and(|other| other == *self)
    }
}

impl fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W/\"{}\"", self.opaque)
    }
}

impl FromStr for ContentVersion {
    type Err = ScimError;

    /// Parse a weak (`W/"..."`) or strong (`"..."`) ETag.
    fn from_str(etag: &str) -> ScimResult<Self> {
        let trimmed = etag.trim();
        let quoted = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let opaque = quoted
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .filter(|opaque| !opaque.is_empty())
            .ok_or_else(|| ScimError::invalid_value(format!("'{etag}' is not an ETag")))?;
        Ok(Self::from_hash(opaque))
    }
}

impl Serialize for ContentVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let etag = String::deserialize(deserializer)?;
        etag.parse().map_err(serde::de::Error::custom)
    }
}
