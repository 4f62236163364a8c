//! SCIM PATCH operations (RFC 7644 Section 3.5.2).
//!
//! A [`PatchOperation`] is validated when it is built, whether through its
//! constructors or by deserializing the request body, so applying it only
//! fails on what the target resource holds. A [`PatchRequest`] applies its
//! operations in order and stops at the first failure; operations applied
//! before the failure are not rolled back.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::filter::Evaluator;
//! use scim_patch::patch::PatchRequest;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request: PatchRequest = serde_json::from_value(json!({
//!         "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!         "Operations": [
//!             {"op": "add", "path": "emails", "value": [{"value": "babs@jensen.org", "type": "home"}]},
//!             {"op": "Replace", "path": "active", "value": false},
//!             {"op": "remove", "path": "nickName"}
//!         ]
//!     }))?;
//!
//!     let mut user = json!({"userName": "bjensen", "nickName": "Babs", "active": true});
//!     let root = user.as_object_mut().unwrap();
//!     request.apply(root, &Evaluator::new())?;
//!     assert_eq!(user["active"], json!(false));
//!     assert!(user.get("nickName").is_none());
//!     Ok(())
//! }
//! ```

use crate::error::{ScimError, ScimResult};
use crate::filter::Evaluator;
use crate::node;
use crate::path::Path;
use crate::schema::is_namespace;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Schema URN of a PATCH request message.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

const SCHEMAS: &str = "schemas";

/// The `op` of a PATCH operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchOp {
    type Err = ScimError;

    fn from_str(op: &str) -> ScimResult<Self> {
        [Self::Add, Self::Replace, Self::Remove]
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(op))
            .ok_or_else(|| ScimError::invalid_syntax(format!("Unknown PATCH operation '{op}'")))
    }
}

/// One operation of a PATCH request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireOperation", into = "WireOperation")]
pub enum PatchOperation {
    /// Add `value` at `path`, or merge its attributes into the resource
    /// when there is no path.
    Add { path: Option<Path>, value: Value },
    /// Replace the value at `path`, or the resource's attributes named in
    /// `value` when there is no path.
    Replace { path: Option<Path>, value: Value },
    /// Remove what `path` addresses.
    Remove { path: Path },
}

impl PatchOperation {
    /// Build an `add` operation.
    ///
    /// # Errors
    /// * `InvalidSyntax` when `value` is null or an empty container, or
    ///   when there is no path and `value` is not an object
    /// * `InvalidPath` when `path` contains value filters or is too deep
    pub fn add(path: Option<Path>, value: Value) -> ScimResult<Self> {
        if let Some(path) = &path {
            validate_path(path)?;
            if path.has_filters() {
                return Err(ScimError::invalid_path(
                    "path field for add operations must not include any value selection filters",
                ));
            }
        }
        validate_value(path.as_ref(), &value, PatchOp::Add)?;
        Ok(Self::Add { path, value })
    }

    /// Build a `replace` operation.
    ///
    /// # Errors
    /// * `InvalidSyntax` when `value` is null or an empty container, or
    ///   when there is no path and `value` is not an object
    /// * `InvalidPath` when `path` is too deep or filters a sub-attribute
    ///   on something other than `value`
    pub fn replace(path: Option<Path>, value: Value) -> ScimResult<Self> {
        if let Some(path) = &path {
            validate_path(path)?;
        }
        validate_value(path.as_ref(), &value, PatchOp::Replace)?;
        Ok(Self::Replace { path, value })
    }

    /// Build a `remove` operation. A path is required.
    pub fn remove(path: Option<Path>) -> ScimResult<Self> {
        let path = path.ok_or_else(|| {
            ScimError::invalid_path("path field must not be null for remove operations")
        })?;
        validate_path(&path)?;
        Ok(Self::Remove { path })
    }

    /// Build an operation of kind `op`, parsing `path` when given.
    pub fn build(op: PatchOp, path: Option<&str>, value: Option<Value>) -> ScimResult<Self> {
        let path = path
            .filter(|path| !path.trim().is_empty())
            .map(Path::parse)
            .transpose()?;
        let required = || {
            value.ok_or_else(|| {
                ScimError::invalid_syntax(format!("value field is required for {op} operations"))
            })
        };
        match op {
            PatchOp::Add => Self::add(path, required()?),
            PatchOp::Replace => Self::replace(path, required()?),
            PatchOp::Remove => Self::remove(path),
        }
    }

    pub fn op(&self) -> PatchOp {
        match self {
            Self::Add { .. } => PatchOp::Add,
            Self::Replace { .. } => PatchOp::Replace,
            Self::Remove { .. } => PatchOp::Remove,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Add { path, .. } | Self::Replace { path, .. } => path.as_ref(),
            Self::Remove { path } => Some(path),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } => Some(value),
            Self::Remove { .. } => None,
        }
    }

    /// Apply the operation to `root`.
    ///
    /// After an add or replace, extension schemas the operation wrote to
    /// are registered in the resource's `schemas` list when it has one.
    pub fn apply(&self, root: &mut Map<String, Value>, evaluator: &Evaluator) -> ScimResult<()> {
        debug!(
            "Applying PATCH {} at '{}'",
            self.op(),
            self.path().map(ToString::to_string).unwrap_or_default()
        );
        let root_path = Path::root();
        match self {
            Self::Add { path, value } => {
                node::add_value(root, path.as_ref().unwrap_or(&root_path), value.clone(), evaluator)?;
                self.register_namespaces(root);
            }
            Self::Replace { path, value } => {
                node::replace_value(root, path.as_ref().unwrap_or(&root_path), value.clone(), evaluator)?;
                self.register_namespaces(root);
            }
            Self::Remove { path } => {
                let removed = node::remove_value(root, path, evaluator)?;
                if removed.is_empty() {
                    debug!("PATCH remove at '{path}' matched nothing");
                }
            }
        }
        Ok(())
    }

    fn register_namespaces(&self, root: &mut Map<String, Value>) {
        let Some(Value::Array(schemas)) = root.get_mut(SCHEMAS) else {
            return;
        };
        let urns: Vec<&str> = match (self.path(), self.value()) {
            (Some(path), _) => path.namespace().into_iter().collect(),
            (None, Some(Value::Object(attributes))) => attributes
                .keys()
                .map(String::as_str)
                .filter(|key| is_namespace(key))
                .collect(),
            (None, _) => Vec::new(),
        };
        for urn in urns {
            let known = schemas
                .iter()
                .any(|schema| schema.as_str().is_some_and(|s| s.eq_ignore_ascii_case(urn)));
            if !known {
                debug!("Registering extension schema {urn}");
                schemas.push(Value::String(urn.to_owned()));
            }
        }
    }
}

fn validate_path(path: &Path) -> ScimResult<()> {
    if path.len() > 2 {
        return Err(ScimError::invalid_path(format!(
            "path '{path}' addresses values deeper than a sub-attribute"
        )));
    }
    if let Some(filter) = path.element(1).and_then(|element| element.filter()) {
        let on_value = filter
            .attribute_path()
            .and_then(|filter_path| filter_path.element(0))
            .is_some_and(|element| element.attribute().eq_ignore_ascii_case("value"));
        if !on_value {
            return Err(ScimError::invalid_path(format!(
                "path '{path}' may only filter a sub-attribute on 'value'"
            )));
        }
    }
    Ok(())
}

fn validate_value(path: Option<&Path>, value: &Value, op: PatchOp) -> ScimResult<()> {
    let empty = match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if empty {
        return Err(ScimError::invalid_syntax(
            "value field must not be null or an empty container",
        ));
    }
    if path.is_none() && !value.is_object() {
        return Err(ScimError::invalid_syntax(format!(
            "value field must be a JSON object containing the attributes to {op}"
        )));
    }
    Ok(())
}

/// Wire form of a [`PatchOperation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireOperation {
    op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl TryFrom<WireOperation> for PatchOperation {
    type Error = ScimError;

    fn try_from(wire: WireOperation) -> ScimResult<Self> {
        let op = wire.op.parse()?;
        Self::build(op, wire.path.as_deref(), wire.value)
    }
}

impl From<PatchOperation> for WireOperation {
    fn from(operation: PatchOperation) -> Self {
        let op = operation.op().as_str().to_owned();
        match operation {
            PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => Self {
                op,
                path: path.map(|path| path.to_string()),
                value: Some(value),
            },
            PatchOperation::Remove { path } => Self {
                op,
                path: Some(path.to_string()),
                value: None,
            },
        }
    }
}

/// A PATCH request message: an ordered list of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRequest")]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_owned()],
            operations,
        }
    }

    /// Apply every operation to `root` in order, stopping at the first
    /// error.
    pub fn apply(&self, root: &mut Map<String, Value>, evaluator: &Evaluator) -> ScimResult<()> {
        debug!("Applying PATCH request with {} operations", self.operations.len());
        for operation in &self.operations {
            operation.apply(root, evaluator)?;
        }
        Ok(())
    }
}

impl FromIterator<PatchOperation> for PatchRequest {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(operations: I) -> Self {
        Self::new(operations.into_iter().collect())
    }
}

#[derive(Deserialize)]
struct WireRequest {
    #[serde(default)]
    schemas: Option<Vec<String>>,
    #[serde(rename = "Operations")]
    operations: Vec<PatchOperation>,
}

impl TryFrom<WireRequest> for PatchRequest {
    type Error = ScimError;

    fn try_from(wire: WireRequest) -> ScimResult<Self> {
        let schemas = wire
            .schemas
            .unwrap_or_else(|| vec![PATCH_OP_SCHEMA.to_owned()]);
        if !schemas.iter().any(|s| s.eq_ignore_ascii_case(PATCH_OP_SCHEMA)) {
            return Err(ScimError::invalid_syntax(format!(
                "PATCH request schemas must include {PATCH_OP_SCHEMA}"
            )));
        }
        Ok(Self {
            schemas,
            operations: wire.operations,
        })
    }
}
