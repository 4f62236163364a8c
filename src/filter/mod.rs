//! SCIM filter expressions.
//!
//! [`Filter`] is the AST of the RFC 7644 Section 3.4.2.2 filter grammar,
//! used both for value filters inside paths (`emails[type eq "work"]`) and
//! for standalone filter expressions. [`Evaluator`] decides whether a JSON
//! node matches a filter.
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::filter::{Evaluator, Filter};
//! use serde_json::json;
//!
//! let filter = Filter::parse(r#"type eq "work" and primary eq true"#).unwrap();
//! let email = json!({"type": "Work", "primary": true, "value": "bjensen@example.com"});
//! assert!(Evaluator::new().evaluate(&filter, &email).unwrap());
//! ```

pub mod evaluator;
pub(crate) mod parser;

pub use evaluator::{Evaluator, compare_nodes};

use crate::error::ScimResult;
use crate::path::Path;
use parser::FilterParser;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operators taking an attribute path and a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Co => "co",
            Self::Sw => "sw",
            Self::Ew => "ew",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }

    /// Look up an operator keyword, ignoring ASCII case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let operator = match keyword.to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "co" => Self::Co,
            "sw" => Self::Sw,
            "ew" => Self::Ew,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            _ => return None,
        };
        Some(operator)
    }

    /// `gt`, `ge`, `lt` and `le`.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SCIM filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// All sub-filters match
    And(Vec<Filter>),
    /// Any sub-filter matches
    Or(Vec<Filter>),
    /// The sub-filter does not match
    Not(Box<Filter>),
    /// The attribute has a non-empty value (`pr`)
    Present(Path),
    /// Attribute compared against a literal
    Comparison {
        operator: ComparisonOperator,
        path: Path,
        value: Value,
    },
    /// Value filter nested inside a filter, e.g. `emails[type eq "work"]`
    Complex(Path, Box<Filter>),
}

impl Filter {
    /// Parse a complete filter expression.
    pub fn parse(expression: &str) -> ScimResult<Self> {
        FilterParser::parse(expression)
    }

    pub fn comparison(operator: ComparisonOperator, path: Path, value: impl Into<Value>) -> Self {
        Self::Comparison {
            operator,
            path,
            value: value.into(),
        }
    }

    pub fn eq(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Eq, path, value)
    }

    pub fn ne(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Ne, path, value)
    }

    pub fn co(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Co, path, value)
    }

    pub fn sw(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Sw, path, value)
    }

    pub fn ew(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Ew, path, value)
    }

    pub fn gt(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Gt, path, value)
    }

    pub fn ge(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Ge, path, value)
    }

    pub fn lt(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Lt, path, value)
    }

    pub fn le(path: Path, value: impl Into<Value>) -> Self {
        Self::comparison(ComparisonOperator::Le, path, value)
    }

    pub fn present(path: Path) -> Self {
        Self::Present(path)
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    pub fn complex(path: Path, filter: Filter) -> Self {
        Self::Complex(path, Box::new(filter))
    }

    /// The attribute path this filter tests, for attribute-level filters.
    pub fn attribute_path(&self) -> Option<&Path> {
        match self {
            Self::Present(path) | Self::Comparison { path, .. } | Self::Complex(path, _) => {
                Some(path)
            }
            Self::And(_) | Self::Or(_) | Self::Not(_) => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    match filter {
                        Self::Or(_) => write!(f, "({filter})")?,
                        _ => write!(f, "{filter}")?,
                    }
                }
                Ok(())
            }
            Self::Or(filters) => {
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{filter}")?;
                }
                Ok(())
            }
            Self::Not(filter) => write!(f, "not ({filter})"),
            Self::Present(path) => write!(f, "{path} pr"),
            Self::Comparison {
                operator,
                path,
                value,
            } => write!(f, "{path} {operator} {value}"),
            Self::Complex(path, filter) => write!(f, "{path}[{filter}]"),
        }
    }
}

impl FromStr for Filter {
    type Err = crate::error::ScimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
