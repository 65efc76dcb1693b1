use serde::Deserialize;

use crate::search::ComparisonOperator;

/// Rows returned when a request does not set `paginate`.
pub const DEFAULT_LIMIT: u64 = 100;

/// Application-wide settings for option lookups.
///
/// Deserializes with defaults for every missing field, so it can be embedded in
/// a larger application config:
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct AppConfig {
///     #[serde(default)]
///     select: SelectConfig,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Comparison used by free-text search.
    pub comparison_operator: ComparisonOperator,
    /// Row limit when a request does not set one.
    pub default_limit: u64,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            comparison_operator: ComparisonOperator::default(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl SelectConfig {
    /// Read `SELECT_COMPARISON_OPERATOR` and `SELECT_DEFAULT_LIMIT`, falling back to
    /// defaults for unset or invalid values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("SELECT_COMPARISON_OPERATOR").ok().as_deref(),
            std::env::var("SELECT_DEFAULT_LIMIT").ok().as_deref(),
        )
    }

    fn from_vars(comparison_operator: Option<&str>, default_limit: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = comparison_operator {
            match raw.parse::<ComparisonOperator>() {
                Ok(operator) => config.comparison_operator = operator,
                Err(e) => tracing::warn!(error = %e, "Invalid SELECT_COMPARISON_OPERATOR, using default"),
            }
        }

        if let Some(raw) = default_limit {
            match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => config.default_limit = limit,
                _ => tracing::warn!(value = raw, "Invalid SELECT_DEFAULT_LIMIT, using default"),
            }
        }

        config
    }
}
