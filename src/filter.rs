use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Identity, RelationDef, Value as SqlValue,
    sea_query::{Alias, DynIden, Expr, Query, TableRef},
};
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::traits::SelectResource;

/// Coerce a JSON filter value to a list of SQL values.
///
/// Scalars become one-element lists, `null` becomes an empty list, and nested
/// arrays or objects inside a list are dropped.
#[must_use]
pub fn to_sql_values(value: &Value) -> Vec<SqlValue> {
    match value {
        Value::Array(items) => items.iter().filter_map(to_sql_value).collect(),
        other => to_sql_value(other).into_iter().collect(),
    }
}

fn to_sql_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::Bool(b) => Some((*b).into()),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::from)
            .or_else(|| number.as_u64().map(SqlValue::from))
            .or_else(|| number.as_f64().map(SqlValue::from)),
        Value::String(s) => Some(
            Uuid::parse_str(s.trim()).map_or_else(|_| s.clone().into(), SqlValue::from),
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Look up a column of `E` by its database name.
pub(crate) fn resolve_column<E>(name: &str) -> Option<E::Column>
where
    E: EntityTrait,
    E::Column: FromStr,
{
    let column = E::Column::from_str(name).ok();
    if column.is_none() {
        tracing::warn!(column = name, "Unknown column, ignoring");
    }
    column
}

/// Build the direct-column filters from a `params` map.
///
/// `null` filters on `IS NULL`, anything else on `IN`.
#[must_use]
pub fn column_filters<E>(params: &Map<String, Value>) -> Condition
where
    E: EntityTrait,
    E::Column: FromStr,
{
    let mut condition = Condition::all();
    for (key, value) in params {
        let Some(column) = resolve_column::<E>(key) else {
            continue;
        };

        condition = condition.add(match value {
            Value::Null => column.is_null(),
            _ => column.is_in(to_sql_values(value)),
        });
    }
    condition
}

/// Build the relation filters from a `pivotParams` map.
///
/// Each relation requires at least one related row where every listed
/// attribute is `IN` its values.
#[must_use]
pub fn pivot_filters<E>(pivot_params: &Map<String, Value>) -> Condition
where
    E: SelectResource,
{
    let mut condition = Condition::all();
    for (relation, constraints) in pivot_params {
        let Value::Object(constraints) = constraints else {
            tracing::warn!(relation, "Relation filter must be an object, ignoring");
            continue;
        };

        let Some(path) = E::relation_path(relation) else {
            tracing::warn!(relation, "Unknown relation, ignoring");
            continue;
        };

        let mut related = Condition::all();
        for (attribute, value) in constraints {
            if let Some(column) = related_column(&path, attribute) {
                related = related.add(column.is_in(to_sql_values(value)));
            }
        }

        if let Some(exists) = where_has(&path, related) {
            condition = condition.add(exists);
        }
    }
    condition
}

/// Name a table reference can be qualified by in a column expression.
fn table_name(table: &TableRef) -> Option<DynIden> {
    match table {
        TableRef::Table(name)
        | TableRef::SchemaTable(_, name)
        | TableRef::DatabaseSchemaTable(_, _, name)
        | TableRef::TableAlias(_, name)
        | TableRef::SchemaTableAlias(_, _, name)
        | TableRef::DatabaseSchemaTableAlias(_, _, _, name) => Some(name.clone()),
        _ => None,
    }
}

/// `attribute` on the entity at the end of `path`, qualified by its table.
#[must_use]
pub fn related_column(path: &[RelationDef], attribute: &str) -> Option<Expr> {
    let table = table_name(&path.last()?.to_tbl)?;
    Some(Expr::col((table, Alias::new(attribute))))
}

/// Require a row at the end of `path` matching `condition`.
///
/// Each hop becomes `from_tbl.from_col IN (SELECT to_tbl.to_col FROM to_tbl
/// WHERE ...)`, nested from the last hop outwards. Every column is qualified so
/// the filter holds on base queries that join other tables. Returns `None` for
/// an empty path or a hop keyed on more than one column.
#[must_use]
pub fn where_has(path: &[RelationDef], condition: Condition) -> Option<Condition> {
    if path.is_empty() {
        return None;
    }

    let mut inner = condition;
    for relation in path.iter().rev() {
        let (Identity::Unary(from_col), Identity::Unary(to_col)) =
            (&relation.from_col, &relation.to_col)
        else {
            tracing::warn!("Composite-key relations cannot be filtered, ignoring");
            return None;
        };
        let (Some(from_tbl), Some(to_tbl)) =
            (table_name(&relation.from_tbl), table_name(&relation.to_tbl))
        else {
            tracing::warn!("Relation tables must be named, ignoring");
            return None;
        };

        let subquery = Query::select()
            .column((to_tbl, to_col.clone()))
            .from(relation.to_tbl.clone())
            .cond_where(inner)
            .to_owned();

        let outer = Expr::col((from_tbl, from_col.clone()));
        inner = Condition::all().add(outer.in_subquery(subquery));
    }
    Some(inner)
}
