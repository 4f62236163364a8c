//! Path-addressed reads and SCIM PATCH semantics over JSON trees.
//!
//! The functions here resolve a [`Path`] against a root object and
//! either read the values it addresses or modify them:
//!
//! - [`value`], [`match_path`] and [`exists`] only read;
//! - [`add_value`] merges and appends (PATCH `add`);
//! - [`replace_value`] merges and overwrites, honoring value filters on
//!   the last element (PATCH `replace`);
//! - [`remove_value`] removes what the path addresses (PATCH `remove`).
//!
//! A missing field and a field holding an explicit `null` are different
//! trees: [`value`] returns `None` for the former and `Some(Value::Null)`
//! for the latter. Modifications treat both as absent.
//!
//! Nothing is rolled back: when an update fails part-way through a
//! multi-valued attribute, the elements already updated stay updated.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::filter::Evaluator;
//! use scim_patch::node;
//! use scim_patch::path::Path;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut user = json!({
//!     "addresses": [
//!         {"type": "work", "region": "CA"},
//!         {"type": "home", "region": "NY"}
//!     ]
//! });
//! let root = user.as_object_mut().unwrap();
//! let evaluator = Evaluator::new();
//!
//! let path = Path::parse(r#"addresses[type eq "home"].region"#)?;
//! node::replace_value(root, &path, json!("TX"), &evaluator)?;
//! assert_eq!(node::value(root, &path, &evaluator)?, Some(json!("TX")));
//! # Ok(())
//! # }
//! ```

pub(crate) mod traversal;


use crate::error::ScimResult;
use crate::filter::Evaluator;
use crate::path::Path;
use log::debug;
use serde_json::{Map, Value};

/// What a traversal does once it reaches the last step of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Collect the addressed values, removing them from the tree when
    /// `remove` is set.
    Gather { remove: bool },
    /// Merge `value` into the addressed location. With `append`, arrays
    /// gain the elements they do not hold yet; otherwise arrays are
    /// replaced and a value filter on the last element selects which
    /// elements get replaced.
    Update { value: Value, append: bool },
}

impl Operation {
    pub fn gather() -> Self {
        Self::Gather { remove: false }
    }

    pub fn remove() -> Self {
        Self::Gather { remove: true }
    }

    pub fn add(value: Value) -> Self {
        Self::Update {
            value,
            append: true,
        }
    }

    pub fn replace(value: Value) -> Self {
        Self::Update {
            value,
            append: false,
        }
    }
}

/// Run `operation` over `root` along `path`.
///
/// # Arguments
/// * `operation` - What to do at the addressed location
/// * `root` - The resource's root object
/// * `path` - Where to do it
/// * `evaluator` - Decides which elements value filters select
///
/// # Returns
/// The gathered (or removed) values in tree order; empty for updates.
pub fn apply(
    operation: &Operation,
    root: &mut Map<String, Value>,
    path: &Path,
    evaluator: &Evaluator,
) -> ScimResult<Vec<Value>> {
    let mut results = Vec::new();
    traversal::traverse(operation, root, path, 0, evaluator, &mut results)?;
    Ok(results)
}

/// The first value `path` addresses, if any.
///
/// An explicit `null` in the tree is returned as `Some(Value::Null)`.
pub fn value(
    root: &Map<String, Value>,
    path: &Path,
    evaluator: &Evaluator,
) -> ScimResult<Option<Value>> {
    Ok(traversal::select(root, path, 0, evaluator)?
        .into_iter()
        .next()
        .map(|value| value.into_owned()))
}

/// Every value `path` addresses, in tree order.
///
/// A multi-valued attribute contributes one Array holding its (filtered)
/// elements.
pub fn match_path(
    root: &Map<String, Value>,
    path: &Path,
    evaluator: &Evaluator,
) -> ScimResult<Vec<Value>> {
    Ok(traversal::select(root, path, 0, evaluator)?
        .into_iter()
        .map(|value| value.into_owned())
        .collect())
}

/// Whether `path` addresses anything: a non-empty (filtered) array, or any
/// other value including an explicit `null`.
pub fn exists(root: &Map<String, Value>, path: &Path, evaluator: &Evaluator) -> ScimResult<bool> {
    Ok(!traversal::select(root, path, 0, evaluator)?.is_empty())
}

/// PATCH `add`: merge `value` at `path`, appending to arrays.
pub fn add_value(
    root: &mut Map<String, Value>,
    path: &Path,
    value: Value,
    evaluator: &Evaluator,
) -> ScimResult<()> {
    debug!("Adding value at '{path}'");
    apply(&Operation::add(value), root, path, evaluator).map(drop)
}

/// PATCH `replace`: merge `value` at `path`, replacing arrays. A value
/// filter on the last path element replaces only the matching elements
/// and fails with [`ScimError::NoTarget`](crate::error::ScimError::NoTarget)
/// when none match.
pub fn replace_value(
    root: &mut Map<String, Value>,
    path: &Path,
    value: Value,
    evaluator: &Evaluator,
) -> ScimResult<()> {
    debug!("Replacing value at '{path}'");
    apply(&Operation::replace(value), root, path, evaluator).map(drop)
}

/// PATCH `remove`: remove what `path` addresses and return it.
///
/// Removing filtered elements drops the attribute itself once its array
/// is empty.
pub fn remove_value(
    root: &mut Map<String, Value>,
    path: &Path,
    evaluator: &Evaluator,
) -> ScimResult<Vec<Value>> {
    debug!("Removing value at '{path}'");
    apply(&Operation::remove(), root, path, evaluator)
}
