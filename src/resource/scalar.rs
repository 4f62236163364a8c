//! Conversions between tree nodes and typed SCIM values.
//!
//! [`NodeValue`] is implemented for every SCIM simple type:
//!
//! | SCIM type   | Rust type         | Node form                       |
//! |-------------|-------------------|---------------------------------|
//! | `boolean`   | `bool`            | JSON boolean                    |
//! | `integer`   | `i32`, `i64`      | JSON integer or integral number |
//! | `decimal`   | `f64`             | JSON number                     |
//! | `dateTime`  | `DateTime<Utc>`   | RFC 3339 text, `Z` offset       |
//! | `string`    | `String`          | JSON string                     |
//! | `binary`    | [`Binary`]        | base64 text (standard, padded)  |
//! | `reference` | [`Reference`]     | URI text                        |

use super::reference::Reference;
use crate::config::EngineConfig;
use crate::error::{ScimError, ScimResult};
use crate::filter::evaluator::parse_date;
use crate::path::Path;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

/// A typed value that can be read from and written to a tree node.
pub trait NodeValue: Sized {
    /// Convert the node found at `path`. `path` only names the location
    /// in error messages.
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self>;

    /// The node representing this value.
    fn to_node(&self, config: &EngineConfig) -> Value;
}

fn wrong_kind(node: &Value, path: &Path, expected: &str) -> ScimError {
    ScimError::invalid_value(format!(
        "Value at path '{path}' is not {expected}: {node}"
    ))
}

/// The node as an `i64`, accepting integral floats such as `12.0`.
fn integral(node: &Value) -> Option<i64> {
    node.as_i64().or_else(|| {
        node.as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64)
            .map(|n| n as i64)
    })
}

impl NodeValue for bool {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        node.as_bool().ok_or_else(|| wrong_kind(node, path, "a boolean"))
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::Bool(*self)
    }
}

impl NodeValue for i32 {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        integral(node)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| wrong_kind(node, path, "a 32-bit integer"))
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::from(*self)
    }
}

impl NodeValue for i64 {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        integral(node).ok_or_else(|| wrong_kind(node, path, "an integer"))
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::from(*self)
    }
}

impl NodeValue for f64 {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        node.as_f64().ok_or_else(|| wrong_kind(node, path, "a number"))
    }

    /// Non-finite values have no JSON form and become `null`.
    fn to_node(&self, _config: &EngineConfig) -> Value {
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl NodeValue for DateTime<Utc> {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        let text = node.as_str().ok_or_else(|| wrong_kind(node, path, "a dateTime"))?;
        parse_date(text).ok_or_else(|| ScimError::invalid_encoding(path.to_string(), "dateTime"))
    }

    fn to_node(&self, config: &EngineConfig) -> Value {
        Value::String(self.to_rfc3339_opts(config.date_precision.seconds_format(), true))
    }
}

impl NodeValue for String {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        node.as_str()
            .map(str::to_owned)
            .ok_or_else(|| wrong_kind(node, path, "a string"))
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::String(self.clone())
    }
}

/// Bytes of a SCIM `binary` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl NodeValue for Binary {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        let text = node.as_str().ok_or_else(|| wrong_kind(node, path, "base64 text"))?;
        BASE64
            .decode(text)
            .map(Binary)
            .map_err(|_| ScimError::invalid_encoding(path.to_string(), "base64"))
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::String(BASE64.encode(&self.0))
    }
}

impl NodeValue for Reference {
    fn from_node(node: &Value, path: &Path) -> ScimResult<Self> {
        let text = node.as_str().ok_or_else(|| wrong_kind(node, path, "a URI"))?;
        Reference::parse(text)
    }

    fn to_node(&self, _config: &EngineConfig) -> Value {
        Value::String(self.to_string())
    }
}
