//! SCIM attribute paths.
//!
//! A [`Path`] addresses one or more values inside a resource, e.g.
//! `name.givenName`, `addresses[type eq "work"].streetAddress` or
//! `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber`.
//! Each element names an attribute and may carry a value filter selecting
//! elements of a multi-valued attribute. An extension schema URN, when
//! present, is kept as the path's namespace.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::path::Path;
//!
//! let path = Path::parse(r#"emails[type eq "work"].value"#).unwrap();
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.element(0).unwrap().attribute(), "emails");
//! assert!(path.element(0).unwrap().filter().is_some());
//! assert_eq!(path.to_string(), r#"emails[type eq "work"].value"#);
//! ```

use crate::error::{ScimError, ScimResult};
use crate::filter::Filter;
use crate::filter::parser::FilterParser;
use crate::schema::is_namespace;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`]: an attribute name with an optional value filter.
#[derive(Debug, Clone)]
pub struct PathElement {
    attribute: String,
    filter: Option<Filter>,
}

impl PathElement {
    pub fn new(attribute: impl Into<String>, filter: Option<Filter>) -> Self {
        Self {
            attribute: attribute.into(),
            filter,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

impl PartialEq for PathElement {
    fn eq(&self, other: &Self) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute) && self.filter == other.filter
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "{}[{}]", self.attribute, filter),
            None => f.write_str(&self.attribute),
        }
    }
}

/// A parsed SCIM attribute path.
///
/// Paths are immutable; the builder-style methods return new paths.
/// Equality ignores ASCII case of attribute names and the namespace.
#[derive(Debug, Clone, Default)]
pub struct Path {
    namespace: Option<String>,
    elements: Vec<PathElement>,
}

impl Path {
    /// The empty path addressing the resource itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path with no elements inside the given extension schema.
    pub fn root_of(namespace: impl Into<String>) -> ScimResult<Self> {
        let namespace = namespace.into();
        if !is_namespace(&namespace) {
            return Err(ScimError::invalid_path(format!(
                "'{namespace}' is not a valid schema namespace"
            )));
        }
        Ok(Self {
            namespace: Some(namespace),
            elements: Vec::new(),
        })
    }

    /// Parse a path expression.
    ///
    /// An empty or whitespace-only expression yields the root path.
    pub fn parse(expression: &str) -> ScimResult<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let (namespace, attributes) = if is_namespace(trimmed) {
            let search_end = trimmed.find('[').unwrap_or(trimmed.len());
            match trimmed[..search_end].rfind(':') {
                Some(colon) => (Some(&trimmed[..colon]), &trimmed[colon + 1..]),
                None => (None, trimmed),
            }
        } else {
            (None, trimmed)
        };

        let mut path = match namespace {
            Some(namespace) => Self::root_of(namespace)?,
            None => Self::root(),
        };
        path.elements = parse_elements(attributes)?;
        Ok(path)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Number of attribute elements, not counting the namespace.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the path addresses the resource itself (no namespace, no elements).
    pub fn is_root(&self) -> bool {
        self.namespace.is_none() && self.elements.is_empty()
    }

    /// Number of traversal steps: the element count, plus one for a namespace.
    pub fn depth(&self) -> usize {
        self.elements.len() + usize::from(self.namespace.is_some())
    }

    pub fn element(&self, index: usize) -> Option<&PathElement> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.elements.iter()
    }

    /// Whether any element carries a value filter.
    pub fn has_filters(&self) -> bool {
        self.elements.iter().any(|element| element.filter.is_some())
    }

    /// A new path with `attribute` appended.
    pub fn with_attribute(&self, attribute: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.elements.push(PathElement::new(attribute, None));
        path
    }

    /// A new path with a filtered `attribute` appended.
    pub fn with_filtered_attribute(&self, attribute: impl Into<String>, filter: Filter) -> Self {
        let mut path = self.clone();
        path.elements.push(PathElement::new(attribute, Some(filter)));
        path
    }

    /// A new path with the elements of `other` appended. The namespace of
    /// `other` is ignored.
    pub fn append(&self, other: &Path) -> Self {
        let mut path = self.clone();
        path.elements.extend(other.elements.iter().cloned());
        path
    }

    /// The prefix holding the first `count` elements.
    pub fn sub(&self, count: usize) -> Self {
        Self {
            namespace: self.namespace.clone(),
            elements: self.elements.iter().take(count).cloned().collect(),
        }
    }

    /// A new path with the attribute of element `index` renamed.
    pub fn replace_attribute(&self, index: usize, attribute: impl Into<String>) -> ScimResult<Self> {
        let mut path = self.clone();
        let element = path.element_mut(index)?;
        element.attribute = attribute.into();
        Ok(path)
    }

    /// A new path with the filter of element `index` replaced.
    pub fn replace_filter(&self, index: usize, filter: Option<Filter>) -> ScimResult<Self> {
        let mut path = self.clone();
        let element = path.element_mut(index)?;
        element.filter = filter;
        Ok(path)
    }

    /// The same path with every value filter dropped.
    pub fn without_filters(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            elements: self
                .elements
                .iter()
                .map(|element| PathElement::new(element.attribute.clone(), None))
                .collect(),
        }
    }

    fn element_mut(&mut self, index: usize) -> ScimResult<&mut PathElement> {
        let len = self.elements.len();
        self.elements.get_mut(index).ok_or_else(|| {
            ScimError::invalid_path(format!("element index {index} out of range for path of length {len}"))
        })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '$')
}

fn parse_elements(input: &str) -> ScimResult<Vec<PathElement>> {
    let mut elements: Vec<PathElement> = Vec::new();
    if input.is_empty() {
        return Ok(elements);
    }

    let mut pos = 0;
    loop {
        let start = pos;
        let rest = &input[pos..];
        pos += rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let name = &input[start..pos];

        let next = input[pos..].chars().next();
        if name.is_empty() {
            return Err(match next {
                Some(c) if c != '.' && c != '[' => ScimError::invalid_path(format!(
                    "Unexpected character '{c}' at position {pos} of '{input}'"
                )),
                _ => ScimError::invalid_path(format!(
                    "Attribute name expected at position {pos} of '{input}'"
                )),
            });
        }

        let filter = match next {
            Some('[') => {
                let (filter, consumed) = FilterParser::parse_value_filter(&input[pos + 1..])
                    .map_err(|e| {
                        ScimError::invalid_path(format!("Invalid value filter in '{input}': {e}"))
                    })?;
                pos += 1 + consumed;
                Some(filter)
            }
            _ => None,
        };
        elements.push(PathElement::new(name, filter));

        match input[pos..].chars().next() {
            None => return Ok(elements),
            Some('.') => {
                pos += 1;
                if pos == input.len() {
                    return Err(ScimError::invalid_path(format!(
                        "Unexpected end of path '{input}'"
                    )));
                }
            }
            Some(c) => {
                return Err(ScimError::invalid_path(format!(
                    "Unexpected character '{c}' at position {pos} of '{input}'"
                )));
            }
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        let namespaces_match = match (&self.namespace, &other.namespace) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        namespaces_match && self.elements == other.elements
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}:")?;
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ScimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = ScimError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let expression = String::deserialize(deserializer)?;
        Self::parse(&expression).map_err(serde::de::Error::custom)
    }
}

/// Anything a path-taking accessor accepts: a parsed [`Path`] or its text.
pub trait IntoPath {
    fn into_path(self) -> ScimResult<Path>;
}

impl IntoPath for Path {
    fn into_path(self) -> ScimResult<Path> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> ScimResult<Path> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> ScimResult<Path> {
        Path::parse(self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> ScimResult<Path> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> ScimResult<Path> {
        Path::parse(&self)
    }
}
