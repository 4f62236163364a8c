//! Filter evaluation against JSON nodes.
//!
//! The evaluator works on the candidate values a filter's attribute path
//! selects from a node:
//!
//! - an Object node contributes every value the path matches, with arrays
//!   flattened into their elements;
//! - a scalar node contributes itself when the path is exactly `value`, so
//!   value filters such as `emails[value ew "example.com"]` also work on
//!   multi-valued attributes of plain strings;
//! - an Array node contributes what each of its elements contributes.
//!
//! Comparison operators only look at scalar candidates. A path that selects
//! nothing but objects or arrays matches no comparison at all.

use super::{ComparisonOperator, Filter};
use crate::config::EngineConfig;
use crate::error::{ScimError, ScimResult};
use crate::node::traversal;
use crate::path::Path;
use crate::schema::{AttributeDefinition, AttributeType};
use chrono::{DateTime, Utc};
use log::trace;
use serde_json::Value;
use std::cmp::Ordering;

/// Decides whether JSON nodes match SCIM filters.
///
/// String comparisons are case-insensitive unless the attribute is known
/// to be case-exact: either through attribute definitions supplied with
/// [`Evaluator::with_definitions`], or through [`EngineConfig::case_exact`]
/// for attributes no definition covers.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    case_exact: bool,
    definitions: Vec<AttributeDefinition>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            case_exact: config.case_exact,
            definitions: Vec::new(),
        }
    }

    /// Compare strings of attributes no definition covers case-exactly.
    pub fn with_case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    /// Resolve filter attribute paths against `definitions` to decide
    /// case-exactness. Paths are resolved relative to the node under
    /// evaluation, so value filters on a multi-valued attribute want the
    /// sub-attributes of that attribute.
    pub fn with_definitions(mut self, definitions: &[AttributeDefinition]) -> Self {
        self.definitions = definitions.to_vec();
        self
    }

    /// Evaluate `filter` against `node`.
    pub fn evaluate(&self, filter: &Filter, node: &Value) -> ScimResult<bool> {
        match filter {
            Filter::And(filters) => {
                for filter in filters {
                    if !self.evaluate(filter, node)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for filter in filters {
                    if self.evaluate(filter, node)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(filter) => Ok(!self.evaluate(filter, node)?),
            Filter::Present(path) => Ok(self
                .candidates(path, node)?
                .iter()
                .any(|candidate| {
                    !candidate.is_null() && !candidate.as_array().is_some_and(Vec::is_empty)
                })),
            Filter::Comparison {
                operator,
                path,
                value,
            } => self.compare(*operator, path, value, node),
            Filter::Complex(path, filter) => {
                for candidate in self.candidates(path, node)? {
                    if self.evaluate(filter, &candidate)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn compare(
        &self,
        operator: ComparisonOperator,
        path: &Path,
        value: &Value,
        node: &Value,
    ) -> ScimResult<bool> {
        let mut candidates = self.candidates(path, node)?;
        let case_exact = self.is_case_exact(path);
        trace!(
            "Comparing {} candidate(s) of '{path}' {operator} {value}",
            candidates.len()
        );
        if operator.is_ordering() && (value.is_boolean() || value.is_null()) {
            return Err(ScimError::invalid_filter(format!(
                "Filter operator '{operator}' may not compare boolean or null values"
            )));
        }
        if !candidates.is_empty() && candidates.iter().all(is_complex) {
            return Ok(false);
        }
        candidates.retain(|candidate| !is_complex(candidate));

        match operator {
            ComparisonOperator::Eq => Ok(equals_any(&candidates, value, case_exact)),
            ComparisonOperator::Ne => Ok(!equals_any(&candidates, value, case_exact)),
            ComparisonOperator::Gt
            | ComparisonOperator::Ge
            | ComparisonOperator::Lt
            | ComparisonOperator::Le => {
                for candidate in &candidates {
                    if candidate.is_boolean() {
                        return Err(ScimError::invalid_filter(format!(
                            "Filter operator '{operator}' may not compare boolean attribute '{path}'"
                        )));
                    }
                    if candidate.is_null() {
                        continue;
                    }
                    let ordering = compare_values(candidate, value, case_exact);
                    let hit = match operator {
                        ComparisonOperator::Gt => ordering == Ordering::Greater,
                        ComparisonOperator::Ge => ordering != Ordering::Less,
                        ComparisonOperator::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    };
                    if hit {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ComparisonOperator::Co | ComparisonOperator::Sw | ComparisonOperator::Ew => {
                let Value::String(needle) = value else {
                    return Ok(false);
                };
                let needle = fold(needle, case_exact);
                Ok(candidates.iter().any(|candidate| match candidate {
                    Value::String(text) => {
                        let text = fold(text, case_exact);
                        match operator {
                            ComparisonOperator::Co => text.contains(needle.as_str()),
                            ComparisonOperator::Sw => text.starts_with(needle.as_str()),
                            _ => text.ends_with(needle.as_str()),
                        }
                    }
                    _ => false,
                }))
            }
        }
    }

    fn candidates(&self, path: &Path, node: &Value) -> ScimResult<Vec<Value>> {
        match node {
            Value::Array(items) => {
                let mut candidates = Vec::new();
                for item in items {
                    candidates.extend(self.candidates(path, item)?);
                }
                Ok(candidates)
            }
            Value::Object(map) => {
                let mut candidates = Vec::new();
                for matched in traversal::select(map, path, 0, self)? {
                    match matched.into_owned() {
                        Value::Array(items) => candidates.extend(items),
                        other => candidates.push(other),
                    }
                }
                Ok(candidates)
            }
            scalar if is_value_path(path) => Ok(vec![scalar.clone()]),
            _ => Ok(Vec::new()),
        }
    }

    fn is_case_exact(&self, path: &Path) -> bool {
        match AttributeDefinition::find(&self.definitions, path) {
            Some(definition) => is_case_exact_string(definition),
            None => self.case_exact,
        }
    }
}

fn is_value_path(path: &Path) -> bool {
    path.namespace().is_none()
        && path.len() == 1
        && path
            .element(0)
            .is_some_and(|e| e.filter().is_none() && e.attribute().eq_ignore_ascii_case("value"))
}

fn is_complex(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn is_case_exact_string(definition: &AttributeDefinition) -> bool {
    definition.data_type == AttributeType::String && definition.case_exact
}

fn equals_any(candidates: &[Value], value: &Value, case_exact: bool) -> bool {
    if value.is_null() {
        return candidates.is_empty() || candidates.iter().any(Value::is_null);
    }
    candidates
        .iter()
        .any(|candidate| !candidate.is_null() && compare_values(candidate, value, case_exact).is_eq())
}

fn fold(text: &str, case_exact: bool) -> String {
    if case_exact {
        text.to_owned()
    } else {
        text.to_lowercase()
    }
}

/// Parse an RFC 3339 date-time, normalizing any offset to UTC.
pub(crate) fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn compare_values(lhs: &Value, rhs: &Value, case_exact: bool) -> Ordering {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => {
            if let (Some(a), Some(b)) = (parse_date(a), parse_date(b)) {
                return a.cmp(&b);
            }
            if case_exact {
                a.cmp(b)
            } else {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
        }
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => text_of(lhs).cmp(&text_of(rhs)),
            },
        },
        _ => text_of(lhs).cmp(&text_of(rhs)),
    }
}

/// Order two nodes the way filters compare them.
///
/// Two strings that both parse as RFC 3339 date-times compare
/// chronologically. Other strings compare ignoring case unless
/// `definition` is a case-exact string attribute. Numbers compare
/// numerically. Anything else compares by its textual rendering.
pub fn compare_nodes(lhs: &Value, rhs: &Value, definition: Option<&AttributeDefinition>) -> Ordering {
    compare_values(lhs, rhs, definition.is_some_and(is_case_exact_string))
}
