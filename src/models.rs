use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::IntoParams;

/// A single option row: the serialized model plus any appended attributes.
pub type Record = Map<String, Value>;

/// Query parameters accepted by an options endpoint.
///
/// # Selection
/// `value` holds the keys already selected in the widget. It may be a JSON array
/// (`[1, 2]`), a JSON scalar (`3`), or a bare string which is taken as one key.
///
/// # Filtering
/// - `params`: JSON object of column to value, list of values, or `null`, for example:
///   ```json
///   {"status": "active", "category_id": [1, 2], "archived_at": null}
///   ```
/// - `pivotParams`: JSON object of relation to attribute constraints, for example:
///   ```json
///   {"tags": {"name": ["sale", "new"]}}
///   ```
///
/// # Search and limit
/// `query` is the free-text search term, `paginate` the row limit.
#[serde_as]
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct OptionsRequest {
    /// Keys of the currently selected options.
    ///
    /// Example: `[1, 5]`
    #[param(example = "[1,5]")]
    pub value: Option<String>,
    /// JSON-encoded column filters.
    #[param(example = json!({"status": "active"}))]
    pub params: Option<String>,
    /// JSON-encoded relation filters.
    #[serde(rename = "pivotParams")]
    #[param(example = json!({"tags": {"name": "sale"}}))]
    pub pivot_params: Option<String>,
    /// Free-text search term.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(example = "lap")]
    pub query: Option<String>,
    /// Maximum number of unselected rows to return; invalid values fall back
    /// to the default limit.
    ///
    /// Example: `20`
    #[param(example = "20")]
    pub paginate: Option<String>,
}

/// Parsed, request-scoped parameters of a single options lookup.
///
/// Parsing never fails: absent or malformed fields become empty values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsParams {
    pub value: Vec<Value>,
    pub params: Map<String, Value>,
    pub pivot_params: Map<String, Value>,
    pub search: Option<String>,
    pub limit: Option<u64>,
}

impl OptionsParams {
    #[must_use]
    pub fn from_request(request: &OptionsRequest) -> Self {
        Self {
            value: parse_value(request.value.as_deref()),
            params: parse_json_object(request.params.as_deref(), "params"),
            pivot_params: parse_json_object(request.pivot_params.as_deref(), "pivotParams"),
            search: request
                .query
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
            limit: parse_limit(request.paginate.as_deref()),
        }
    }
}

impl From<OptionsRequest> for OptionsParams {
    fn from(request: OptionsRequest) -> Self {
        Self::from_request(&request)
    }
}

fn parse_value(raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(scalar) => vec![scalar],
        // Bare keys such as `value=abc` are not valid JSON
        Err(_) => vec![Value::String(raw.to_string())],
    }
}

fn parse_limit(raw: Option<&str>) -> Option<u64> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;

    match raw.parse::<u64>() {
        Ok(limit) => Some(limit),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "Invalid paginate, using default limit");
            None
        }
    }
}

fn parse_json_object(raw: Option<&str>, field: &str) -> Map<String, Value> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(other) => {
            tracing::warn!(field, value = %other, "Expected a JSON object, ignoring");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "Invalid JSON, ignoring");
            Map::new()
        }
    }
}
