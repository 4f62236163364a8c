//! Recursive path traversal.
//!
//! [`traverse`] walks a mutable tree one path step at a time, dispatching
//! on the [`Operation`] at every level. [`select`] is its read-only twin
//! for queries that never modify the tree. Both pick the field and filter
//! for a step the same way: with a namespace, step 0 addresses the
//! extension object and step `i` the element `i - 1`; without one, step
//! `i` addresses element `i`. A root path has no field at all and its
//! single step acts on the node itself.

use super::Operation;
use crate::error::{ScimError, ScimResult};
use crate::filter::{Evaluator, Filter};
use crate::path::Path;
use log::{debug, trace};
use serde_json::{Map, Value};
use std::borrow::Cow;

type Object = Map<String, Value>;

struct Step<'p> {
    field: Option<&'p str>,
    filter: Option<&'p Filter>,
    leaf: bool,
}

impl<'p> Step<'p> {
    fn at(path: &'p Path, index: usize) -> Self {
        let element = match path.namespace() {
            Some(namespace) if index == 0 => {
                return Self {
                    field: Some(namespace),
                    filter: None,
                    leaf: path.depth() <= 1,
                };
            }
            Some(_) => path.element(index - 1),
            None => path.element(index),
        };
        Self {
            field: element.map(|e| e.attribute()),
            filter: element.and_then(|e| e.filter()),
            leaf: index + 1 >= path.depth(),
        }
    }
}

/// The key under which `field` lives in `node`: an exact match, or else
/// the first key equal ignoring ASCII case.
fn resolve_key(node: &Object, field: &str) -> Option<String> {
    if node.contains_key(field) {
        return Some(field.to_owned());
    }
    node.keys().find(|key| key.eq_ignore_ascii_case(field)).cloned()
}

fn lookup<'a>(node: &'a Object, field: &str) -> Option<&'a Value> {
    node.get(field).or_else(|| {
        node.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    })
}

fn is_void(value: &Value) -> bool {
    value.is_null() || value.as_array().is_some_and(Vec::is_empty)
}

/// Apply `operation` to `node` from path step `index` onwards.
///
/// Values gathered at the leaf are appended to `results`; an update
/// appends nothing.
pub(crate) fn traverse(
    operation: &Operation,
    node: &mut Object,
    path: &Path,
    index: usize,
    evaluator: &Evaluator,
    results: &mut Vec<Value>,
) -> ScimResult<()> {
    let step = Step::at(path, index);
    trace!(
        "Traversing step {index} of '{path}' (field {:?}, leaf {})",
        step.field, step.leaf
    );

    if step.leaf {
        return match operation {
            Operation::Gather { remove } => gather_leaf(node, &step, *remove, evaluator, results),
            Operation::Update { value, append } => {
                update_leaf(node, &step, value, *append, evaluator)
            }
        };
    }

    let children = match operation {
        Operation::Gather { .. } => gather_children(node, &step, evaluator)?,
        Operation::Update { .. } => update_children(node, &step, evaluator)?,
    };
    for child in children {
        traverse(operation, child, path, index + 1, evaluator, results)?;
    }
    Ok(())
}

fn gather_children<'a>(
    node: &'a mut Object,
    step: &Step<'_>,
    evaluator: &Evaluator,
) -> ScimResult<Vec<&'a mut Object>> {
    let Some(key) = step.field.and_then(|field| resolve_key(node, field)) else {
        return Ok(Vec::new());
    };

    let mut children = Vec::new();
    match node.get_mut(&key) {
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Some(filter) = step.filter {
                    if !evaluator.evaluate(filter, item)? {
                        continue;
                    }
                }
                if let Value::Object(child) = item {
                    children.push(child);
                }
            }
        }
        Some(Value::Object(child)) => children.push(child),
        _ => {}
    }
    Ok(children)
}

/// Step into the complex values `step` addresses, creating an empty object
/// when an unfiltered attribute is missing. An explicit null is a scalar and
/// cannot be descended into.
fn update_children<'a>(
    node: &'a mut Object,
    step: &Step<'_>,
    evaluator: &Evaluator,
) -> ScimResult<Vec<&'a mut Object>> {
    let Some(field) = step.field else {
        return Ok(vec![node]);
    };
    let key = resolve_key(node, field).unwrap_or_else(|| field.to_owned());

    match node.get(&key) {
        Some(Value::Array(_) | Value::Object(_)) => {}
        None if step.filter.is_none() => {
            node.insert(key.clone(), Value::Object(Map::new()));
        }
        _ => {
            debug!("Cannot descend into attribute '{field}': not a complex or multi-valued value");
            return Err(ScimError::invalid_target(format!(
                "Attribute {field} does not have a multi-valued or complex value"
            )));
        }
    }

    let mut children = Vec::new();
    match node.get_mut(&key) {
        Some(Value::Array(items)) => {
            let mut matched = 0;
            for item in items.iter_mut() {
                if let Some(filter) = step.filter {
                    if !evaluator.evaluate(filter, item)? {
                        continue;
                    }
                }
                matched += 1;
                if let Value::Object(child) = item {
                    children.push(child);
                }
            }
            if let Some(filter) = step.filter {
                if matched == 0 {
                    debug!("Value filter '{filter}' matched nothing in attribute '{field}'");
                    return Err(ScimError::invalid_target(format!(
                        "Attribute {field} does not have a value matching the filter {filter}"
                    )));
                }
            }
        }
        Some(Value::Object(child)) => children.push(child),
        _ => {}
    }
    Ok(children)
}

fn gather_leaf(
    node: &mut Object,
    step: &Step<'_>,
    remove: bool,
    evaluator: &Evaluator,
    results: &mut Vec<Value>,
) -> ScimResult<()> {
    let Some(key) = step.field.and_then(|field| resolve_key(node, field)) else {
        return Ok(());
    };

    let Some(Value::Array(items)) = node.get_mut(&key) else {
        if remove {
            results.extend(node.shift_remove(&key));
        } else {
            results.extend(node.get(&key).cloned());
        }
        return Ok(());
    };

    let (selected, remove_field) = match step.filter {
        Some(filter) => {
            let hits = items
                .iter()
                .map(|item| evaluator.evaluate(filter, item))
                .collect::<ScimResult<Vec<bool>>>()?;
            if remove {
                let mut selected = Vec::new();
                let mut kept = Vec::new();
                for (item, hit) in std::mem::take(items).into_iter().zip(hits) {
                    if hit {
                        selected.push(item);
                    } else {
                        kept.push(item);
                    }
                }
                *items = kept;
                (selected, items.is_empty())
            } else {
                let selected = items
                    .iter()
                    .zip(hits)
                    .filter(|(_, hit)| *hit)
                    .map(|(item, _)| item.clone())
                    .collect();
                (selected, false)
            }
        }
        None if remove => (std::mem::take(items), true),
        None => (items.clone(), false),
    };

    if !selected.is_empty() {
        results.push(Value::Array(selected));
    }
    if remove_field {
        node.shift_remove(&key);
    }
    Ok(())
}

fn update_leaf(
    node: &mut Object,
    step: &Step<'_>,
    value: &Value,
    append: bool,
    evaluator: &Evaluator,
) -> ScimResult<()> {
    let Some(field) = step.field else {
        if is_void(value) {
            return Ok(());
        }
        if !value.is_object() {
            return Err(ScimError::invalid_value(
                "The value applied to the resource root must be an object",
            ));
        }
        update_node(node, None, value, append);
        return Ok(());
    };
    let key = resolve_key(node, field).unwrap_or_else(|| field.to_owned());

    match step.filter {
        Some(filter) if !append => replace_matching(node, &key, filter, value, evaluator),
        _ => {
            update_node(node, Some(&key), value, append);
            Ok(())
        }
    }
}

/// Replace the values of `node[key]` that `filter` selects. Null and empty
/// values leave them untouched but still require a match.
fn replace_matching(
    node: &mut Object,
    key: &str,
    filter: &Filter,
    value: &Value,
    evaluator: &Evaluator,
) -> ScimResult<()> {
    let void = is_void(value);
    let matched = match node.get_mut(key) {
        Some(Value::Array(items)) => {
            let hits = items
                .iter()
                .map(|item| evaluator.evaluate(filter, item))
                .collect::<ScimResult<Vec<bool>>>()?;
            let mut matched = false;
            for (item, hit) in items.iter_mut().zip(hits) {
                if !hit {
                    continue;
                }
                matched = true;
                if void {
                    continue;
                }
                match (item, value) {
                    (Value::Object(target), Value::Object(update)) => {
                        merge_object(target, update, false)
                    }
                    (item, _) => *item = value.clone(),
                }
            }
            matched
        }
        Some(field_value) => {
            let hit = evaluator.evaluate(filter, field_value)?;
            if hit {
                update_node(node, Some(key), value, false);
            }
            hit
        }
        None => false,
    };

    if !matched {
        debug!("Replace filter '{filter}' matched no value of attribute '{key}'");
        return Err(ScimError::no_target(format!(
            "Attribute {key} does not have a value matching the filter {filter}"
        )));
    }
    Ok(())
}

/// Merge `value` into `parent[key]`, or into `parent` itself when `key`
/// is `None`.
///
/// Null and empty-array values change nothing. Objects merge field by
/// field; arrays append unseen elements when `append` is set; anything
/// else replaces the target outright.
pub(crate) fn update_node(parent: &mut Object, key: Option<&str>, value: &Value, append: bool) {
    if is_void(value) {
        return;
    }
    let Some(key) = key else {
        if let Value::Object(update) = value {
            merge_object(parent, update, append);
        }
        return;
    };
    let key = resolve_key(parent, key).unwrap_or_else(|| key.to_owned());

    match (parent.get_mut(&key), value) {
        (Some(Value::Object(target)), Value::Object(update)) => {
            merge_object(target, update, append);
        }
        (Some(Value::Array(target)), Value::Array(update)) if append => {
            for element in update {
                if !target.contains(element) {
                    target.push(element.clone());
                }
            }
        }
        _ => {
            parent.insert(key, value.clone());
        }
    }
}

fn merge_object(target: &mut Object, update: &Object, append: bool) {
    for (field, value) in update {
        update_node(target, Some(field), value, append);
    }
}

/// Read-only twin of [`traverse`] for gathering without removal.
///
/// Filtered arrays yield a fresh array of the matching elements; every
/// other match borrows from `node`.
pub(crate) fn select<'a>(
    node: &'a Object,
    path: &Path,
    index: usize,
    evaluator: &Evaluator,
) -> ScimResult<Vec<Cow<'a, Value>>> {
    let mut results = Vec::new();
    select_into(node, path, index, evaluator, &mut results)?;
    Ok(results)
}

fn select_into<'a>(
    node: &'a Object,
    path: &Path,
    index: usize,
    evaluator: &Evaluator,
    results: &mut Vec<Cow<'a, Value>>,
) -> ScimResult<()> {
    let step = Step::at(path, index);
    let Some(found) = step.field.and_then(|field| lookup(node, field)) else {
        return Ok(());
    };

    if step.leaf {
        match (found, step.filter) {
            (Value::Array(items), Some(filter)) => {
                let mut selected = Vec::new();
                for item in items {
                    if evaluator.evaluate(filter, item)? {
                        selected.push(item.clone());
                    }
                }
                if !selected.is_empty() {
                    results.push(Cow::Owned(Value::Array(selected)));
                }
            }
            (Value::Array(items), None) if items.is_empty() => {}
            (found, _) => results.push(Cow::Borrowed(found)),
        }
        return Ok(());
    }

    match found {
        Value::Array(items) => {
            for item in items {
                if let Some(filter) = step.filter {
                    if !evaluator.evaluate(filter, item)? {
                        continue;
                    }
                }
                if let Value::Object(child) = item {
                    select_into(child, path, index + 1, evaluator, results)?;
                }
            }
        }
        Value::Object(child) => select_into(child, path, index + 1, evaluator, results)?,
        _ => {}
    }
    Ok(())
}
