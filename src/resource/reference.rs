//! URI values of SCIM `reference` attributes.
//!
//! SCIM references are either absolute URIs (`https://example.com/Users/2819c223`,
//! `urn:...`) or references relative to the service provider's base URI
//! (`../Groups/e9e30dba`). Absolute ones are held as parsed [`url::Url`]s;
//! relative ones are kept as written.

use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::{ParseError, Url};

/// A typed URI reference.
///
/// # Examples
///
/// ```rust
/// use scim_patch::resource::Reference;
///
/// let absolute = Reference::parse("https://example.com/v2/Users/2819c223").unwrap();
/// assert!(absolute.is_absolute());
///
/// let relative = Reference::parse("../Groups/e9e30dba").unwrap();
/// assert_eq!(relative.to_string(), "../Groups/e9e30dba");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Absolute(Url),
    Relative(String),
}

impl Reference {
    /// Parse `text` as an absolute URI, falling back to a relative
    /// reference when it has no scheme.
    pub fn parse(text: &str) -> ScimResult<Self> {
        match Url::parse(text) {
            Ok(url) => Ok(Self::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase)
                if !text.is_empty() && !text.contains(char::is_whitespace) =>
            {
                Ok(Self::Relative(text.to_owned()))
            }
            Err(e) => Err(ScimError::invalid_value(format!(
                "'{text}' is not a valid URI reference: {e}"
            ))),
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }

    /// The absolute URI, resolving a relative reference against `base`.
    pub fn resolve(&self, base: &Url) -> ScimResult<Url> {
        match self {
            Self::Absolute(url) => Ok(url.clone()),
            Self::Relative(text) => base.join(text).map_err(|e| {
                ScimError::invalid_value(format!("Cannot resolve '{text}' against '{base}': {e}"))
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Absolute(url) => url.as_str(),
            Self::Relative(text) => text,
        }
    }
}

impl From<Url> for Reference {
    fn from(url: Url) -> Self {
        Self::Absolute(url)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reference {
    type Err = ScimError;

    fn from_str(text: &str) -> ScimResult<Self> {
        Self::parse(text)
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
