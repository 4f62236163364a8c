//! A schema-less SCIM resource addressed by attribute paths.
//!
//! [`GenericResource`] owns one JSON object and exposes the path engine of
//! [`crate::node`] over it: typed reads through [`NodeValue`], PATCH-style
//! writes, and the envelope fields every SCIM resource carries (`id`,
//! `externalId`, `schemas`, `meta`).

use super::meta::Meta;
use super::reference::Reference;
use super::scalar::{Binary, NodeValue};
use super::version::ContentVersion;
use crate::config::EngineConfig;
use crate::error::{ScimError, ScimResult};
use crate::filter::Evaluator;
use crate::node;
use crate::patch::PatchRequest;
use crate::path::IntoPath;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const ID: &str = "id";
const EXTERNAL_ID: &str = "externalId";
const SCHEMAS: &str = "schemas";
const META: &str = "meta";

/// A SCIM resource held as a JSON object.
///
/// Serializes as the bare object; the engine configuration is not part of
/// the wire form.
///
/// # Examples
///
/// ```rust
/// use scim_patch::resource::GenericResource;
/// use serde_json::json;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut user = GenericResource::try_from(json!({
///         "userName": "bjensen",
///         "emails": [
///             {"value": "bjensen@example.com", "type": "work"},
///             {"value": "babs@jensen.org", "type": "home"}
///         ]
///     }))?;
///
///     user.replace(r#"emails[type eq "work"].value"#, "bjensen@acme.com".to_string())?;
///     assert_eq!(
///         user.string_list("emails.value")?,
///         vec!["bjensen@acme.com", "babs@jensen.org"]
///     );
///     assert!(user.remove(r#"emails[type eq "home"]"#)?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericResource {
    root: Map<String, Value>,
    #[serde(skip)]
    config: EngineConfig,
    #[serde(skip)]
    evaluator: Evaluator,
}

impl GenericResource {
    /// Create an empty resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing object; it is mutated in place from now on.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Use `config` for filter comparisons and typed encodings. Attribute
    /// definitions already on the evaluator are kept.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.evaluator = self.evaluator.with_case_exact(config.case_exact);
        self.config = config;
        self
    }

    /// Use `evaluator` for value filters, e.g. one built with attribute
    /// definitions.
    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// The first value `path` addresses; an explicit `null` is `Some(Null)`.
    pub fn value(&self, path: impl IntoPath) -> ScimResult<Option<Value>> {
        node::value(&self.root, &path.into_path()?, &self.evaluator)
    }

    /// Every value `path` addresses, in tree order.
    pub fn values(&self, path: impl IntoPath) -> ScimResult<Vec<Value>> {
        node::match_path(&self.root, &path.into_path()?, &self.evaluator)
    }

    pub fn exists(&self, path: impl IntoPath) -> ScimResult<bool> {
        node::exists(&self.root, &path.into_path()?, &self.evaluator)
    }

    /// The value at `path` as a `T`. Missing values and explicit `null`
    /// read as `None`.
    pub fn get<T: NodeValue>(&self, path: impl IntoPath) -> ScimResult<Option<T>> {
        let path = path.into_path()?;
        match node::value(&self.root, &path, &self.evaluator)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_node(&value, &path).map(Some),
        }
    }

    /// Every value at `path` as a `T`, with multi-valued attributes
    /// flattened into their elements. `null`s are skipped.
    pub fn get_list<T: NodeValue>(&self, path: impl IntoPath) -> ScimResult<Vec<T>> {
        let path = path.into_path()?;
        let mut list = Vec::new();
        for value in node::match_path(&self.root, &path, &self.evaluator)? {
            match value {
                Value::Array(elements) => {
                    for element in elements.iter().filter(|e| !e.is_null()) {
                        list.push(T::from_node(element, &path)?);
                    }
                }
                Value::Null => {}
                value => list.push(T::from_node(&value, &path)?),
            }
        }
        Ok(list)
    }

    pub fn boolean_value(&self, path: impl IntoPath) -> ScimResult<Option<bool>> {
        self.get(path)
    }

    pub fn boolean_list(&self, path: impl IntoPath) -> ScimResult<Vec<bool>> {
        self.get_list(path)
    }

    pub fn integer_value(&self, path: impl IntoPath) -> ScimResult<Option<i32>> {
        self.get(path)
    }

    pub fn integer_list(&self, path: impl IntoPath) -> ScimResult<Vec<i32>> {
        self.get_list(path)
    }

    pub fn long_value(&self, path: impl IntoPath) -> ScimResult<Option<i64>> {
        self.get(path)
    }

    pub fn long_list(&self, path: impl IntoPath) -> ScimResult<Vec<i64>> {
        self.get_list(path)
    }

    pub fn double_value(&self, path: impl IntoPath) -> ScimResult<Option<f64>> {
        self.get(path)
    }

    pub fn double_list(&self, path: impl IntoPath) -> ScimResult<Vec<f64>> {
        self.get_list(path)
    }

    pub fn date_value(&self, path: impl IntoPath) -> ScimResult<Option<DateTime<Utc>>> {
        self.get(path)
    }

    pub fn date_list(&self, path: impl IntoPath) -> ScimResult<Vec<DateTime<Utc>>> {
        self.get_list(path)
    }

    pub fn string_value(&self, path: impl IntoPath) -> ScimResult<Option<String>> {
        self.get(path)
    }

    pub fn string_list(&self, path: impl IntoPath) -> ScimResult<Vec<String>> {
        self.get_list(path)
    }

    /// Base64-decoded bytes of a binary attribute.
    pub fn binary_value(&self, path: impl IntoPath) -> ScimResult<Option<Vec<u8>>> {
        Ok(self.get::<Binary>(path)?.map(Binary::into_bytes))
    }

    pub fn binary_list(&self, path: impl IntoPath) -> ScimResult<Vec<Vec<u8>>> {
        Ok(self
            .get_list::<Binary>(path)?
            .into_iter()
            .map(Binary::into_bytes)
            .collect())
    }

    pub fn uri_value(&self, path: impl IntoPath) -> ScimResult<Option<Reference>> {
        self.get(path)
    }

    pub fn uri_list(&self, path: impl IntoPath) -> ScimResult<Vec<Reference>> {
        self.get_list(path)
    }

    /// Add `values` to the multi-valued attribute at `path`, keeping the
    /// elements already present and skipping duplicates.
    pub fn add<T: NodeValue>(&mut self, path: impl IntoPath, values: Vec<T>) -> ScimResult<()> {
        let nodes = values.iter().map(|v| v.to_node(&self.config)).collect();
        self.add_value(path, Value::Array(nodes))
    }

    /// PATCH `add` of a raw node.
    pub fn add_value(&mut self, path: impl IntoPath, value: Value) -> ScimResult<()> {
        node::add_value(&mut self.root, &path.into_path()?, value, &self.evaluator)
    }

    /// Set the value at `path`, creating missing complex parents.
    pub fn replace<T: NodeValue>(&mut self, path: impl IntoPath, value: T) -> ScimResult<()> {
        let node = value.to_node(&self.config);
        self.replace_value(path, node)
    }

    /// PATCH `replace` of a raw node.
    pub fn replace_value(&mut self, path: impl IntoPath, value: Value) -> ScimResult<()> {
        node::replace_value(&mut self.root, &path.into_path()?, value, &self.evaluator)
    }

    /// Remove what `path` addresses. Returns whether anything was removed.
    pub fn remove(&mut self, path: impl IntoPath) -> ScimResult<bool> {
        let removed = node::remove_value(&mut self.root, &path.into_path()?, &self.evaluator)?;
        Ok(!removed.is_empty())
    }

    /// Apply every operation of `request` in order. Stops at the first
    /// failing operation; earlier ones stay applied.
    pub fn patch(&mut self, request: &PatchRequest) -> ScimResult<()> {
        request.apply(&mut self.root, &self.evaluator)
    }

    pub fn id(&self) -> ScimResult<Option<String>> {
        self.get(ID)
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> ScimResult<()> {
        self.replace(ID, id.into())
    }

    pub fn external_id(&self) -> ScimResult<Option<String>> {
        self.get(EXTERNAL_ID)
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> ScimResult<()> {
        self.replace(EXTERNAL_ID, external_id.into())
    }

    /// The schema URNs of the resource, in order; empty when unset.
    pub fn schemas(&self) -> ScimResult<Vec<String>> {
        self.get_list(SCHEMAS)
    }

    /// Replace the schema URN list. An empty list leaves it unchanged.
    pub fn set_schemas<I, S>(&mut self, schemas: I) -> ScimResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schemas = schemas
            .into_iter()
            .map(|schema| Value::String(schema.into()))
            .collect();
        self.replace_value(SCHEMAS, Value::Array(schemas))
    }

    pub fn meta(&self) -> ScimResult<Option<Meta>> {
        match self.value(META)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ScimError::invalid_value(format!("Malformed meta: {e}"))),
        }
    }

    /// Merge `meta` into the resource's `meta`; fields `meta` leaves unset
    /// keep their current value.
    pub fn set_meta(&mut self, meta: &Meta) -> ScimResult<()> {
        let value = serde_json::to_value(meta)?;
        self.replace_value(META, value)
    }

    /// Version derived from the resource's current content.
    pub fn content_version(&self) -> ScimResult<ContentVersion> {
        let content = serde_json::to_vec(&self.root)?;
        let version = ContentVersion::from_content(&content);
        debug!("Computed content version {version}");
        Ok(version)
    }
}

impl PartialEq for GenericResource {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl From<Map<String, Value>> for GenericResource {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

impl TryFrom<Value> for GenericResource {
    type Error = ScimError;

    fn try_from(value: Value) -> ScimResult<Self> {
        match value {
            Value::Object(root) => Ok(Self::from_map(root)),
            other => Err(ScimError::invalid_value(format!(
                "A resource must be a JSON object, got: {other}"
            ))),
        }
    }
}

impl From<GenericResource> for Value {
    fn from(resource: GenericResource) -> Self {
        resource.into_value()
    }
}

impl fmt::Display for GenericResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.root).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
