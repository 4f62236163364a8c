//! Engine configuration.
//!
//! [`EngineConfig`] carries the few tunables the patch engine consults when
//! comparing filter values and encoding typed values into the tree. It is
//! serde-enabled so a host application can embed it in its own settings.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// Precision used when a date is written into a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DatePrecision {
    /// Whole seconds (`2024-03-01T10:00:00Z`)
    Seconds,
    /// Milliseconds (`2024-03-01T10:00:00.000Z`)
    Millis,
    /// As many fractional digits as the value needs, so dates round-trip
    #[default]
    Auto,
}

impl DatePrecision {
    pub(crate) fn seconds_format(self) -> SecondsFormat {
        match self {
            Self::Seconds => SecondsFormat::Secs,
            Self::Millis => SecondsFormat::Millis,
            Self::Auto => SecondsFormat::AutoSi,
        }
    }
}

/// Configuration for path evaluation and typed value encoding.
///
/// # Examples
///
/// ```rust
/// use scim_patch::config::{DatePrecision, EngineConfig};
///
/// let config = EngineConfig::default()
///     .with_case_exact(true)
///     .with_date_precision(DatePrecision::Millis);
/// assert!(config.case_exact);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Whether string comparisons in filters are case-sensitive when no
    /// attribute definition says otherwise. SCIM defaults to `false`.
    pub case_exact: bool,

    /// Precision of dates written by typed replace/add calls.
    pub date_precision: DatePrecision,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            case_exact: false,
            date_precision: DatePrecision::Auto,
        }
    }
}

impl EngineConfig {
    /// Set the default case-sensitivity of filter string comparisons.
    pub fn with_case_exact(mut self, case_exact: bool) -> Self {
        self.case_exact = case_exact;
        self
    }

    /// Set the precision used to encode dates.
    pub fn with_date_precision(mut self, precision: DatePrecision) -> Self {
        self.date_precision = precision;
        self
    }
}
