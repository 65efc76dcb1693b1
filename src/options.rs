//! # Option lists for select widgets
//!
//! [`Options`] turns a base query into the rows shown by a searchable select
//! control. Rows the user already picked (`value`) are always returned, even
//! when the search term or the row limit would drop them.
//!
//! ## Pipeline
//!
//! 1. `params` column filters and `pivotParams` relation filters
//! 2. snapshot of the selected rows, taken here so that search and limit do not
//!    apply to them while the filters above still do
//! 3. free-text search over the configured attributes
//! 4. ascending order on the first attribute, unless it is nested
//! 5. row limit (`paginate`, else [`SelectConfig::default_limit`])
//! 6. fetch the unselected rows, merge the snapshot back in, re-sort
//!
//! ```rust,ignore
//! let options = Options::new(product::Entity::find(), "id", ["name", "category.name"])
//!     .search_mode(SearchMode::StartsWith)
//!     .appends(Some(vec!["label".to_string()]));
//!
//! let records = options.resolve(&db, &OptionsParams::from_request(&request)).await?;
//! ```

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;

use crate::config::SelectConfig;
use crate::filter::{column_filters, pivot_filters, resolve_column, to_sql_values};
use crate::models::{OptionsParams, Record};
use crate::search::{Search, SearchMode};
use crate::sort::{is_nested, order_attribute, sort_records};
use crate::traits::SelectResource;

/// Transform applied to each record by [`Options::respond`].
pub type Resource = fn(Record) -> Value;

/// Resolver for a select control's option list.
#[derive(Debug, Clone)]
pub struct Options<E: SelectResource> {
    query: Select<E>,
    track_by: String,
    attributes: Vec<String>,
    search_mode: SearchMode,
    resource: Option<Resource>,
    appends: Option<Vec<String>>,
    config: SelectConfig,
}

impl<E> Options<E>
where
    E: SelectResource,
    E::Column: FromStr,
    E::Model: Serialize,
{
    /// `track_by` names the unique key column; `attributes` the displayable
    /// fields, direct (`name`) or nested (`category.name`).
    pub fn new(
        query: Select<E>,
        track_by: impl Into<String>,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            query,
            track_by: track_by.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            search_mode: SearchMode::default(),
            resource: None,
            appends: None,
            config: SelectConfig::default(),
        }
    }

    #[must_use]
    pub fn search_mode(mut self, search_mode: SearchMode) -> Self {
        self.search_mode = search_mode;
        self
    }

    #[must_use]
    pub fn resource(mut self, resource: Option<Resource>) -> Self {
        self.resource = resource;
        self
    }

    /// Computed attributes added to every record, see
    /// [`SelectResource::computed_attribute`].
    #[must_use]
    pub fn appends(mut self, appends: Option<Vec<String>>) -> Self {
        self.appends = appends;
        self
    }

    #[must_use]
    pub fn config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    fn direct_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .map(String::as_str)
            .filter(|attribute| !is_nested(attribute))
    }

    fn nested_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .map(String::as_str)
            .filter(|attribute| is_nested(attribute))
    }

    /// Build the option list for one request.
    ///
    /// # Errors
    ///
    /// Returns the storage layer's `DbErr` unchanged, `DbErr::Custom` when the
    /// track-by column does not exist, and `DbErr::Json` when a model does not
    /// serialize to a JSON object.
    pub async fn resolve<C>(&self, db: &C, params: &OptionsParams) -> Result<Vec<Record>, DbErr>
    where
        C: ConnectionTrait,
    {
        let track_by = resolve_column::<E>(&self.track_by).ok_or_else(|| {
            DbErr::Custom(format!("Unknown track-by column '{}'", self.track_by))
        })?;
        let keys: Vec<_> = params.value.iter().flat_map(to_sql_values).collect();
        let order_by = order_attribute(&self.attributes);

        let mut query = self
            .query
            .clone()
            .filter(column_filters::<E>(&params.params))
            .filter(pivot_filters::<E>(&params.pivot_params));

        // Selected rows honour the filters above but not search or limit
        let selected = if keys.is_empty() {
            Vec::new()
        } else {
            query
                .clone()
                .filter(track_by.is_in(keys.clone()))
                .all(db)
                .await?
        };

        if let Some(term) = params.search.as_deref() {
            query = Search::new(self.direct_attributes(), term)
                .relations(self.nested_attributes())
                .search_mode(self.search_mode)
                .comparison_operator(self.config.comparison_operator)
                .handle(query);
        }

        if let Some(column) = order_by.and_then(resolve_column::<E>) {
            query = query.order_by_asc(column);
        }

        let limit = params.limit.unwrap_or(self.config.default_limit);
        query = query.limit(limit);

        if !keys.is_empty() {
            query = query.filter(track_by.is_not_in(keys));
        }

        let fetched = query.all(db).await?;
        tracing::debug!(
            selected = selected.len(),
            fetched = fetched.len(),
            limit,
            order_by,
            "Resolved options"
        );

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(fetched.len() + selected.len());
        for model in fetched.into_iter().chain(selected) {
            let record = self.to_record(&model)?;
            let key = record.get(&self.track_by).map(Value::to_string);
            if key.is_none_or(|key| seen.insert(key)) {
                records.push(record);
            }
        }

        if let Some(order_by) = order_by {
            sort_records(&mut records, order_by);
        }

        Ok(records)
    }

    /// [`resolve`](Self::resolve), then map each record through the configured
    /// [`Resource`], if any.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn respond<C>(&self, db: &C, params: &OptionsParams) -> Result<Vec<Value>, DbErr>
    where
        C: ConnectionTrait,
    {
        let records = self.resolve(db, params).await?;
        Ok(match self.resource {
            Some(resource) => records.into_iter().map(resource).collect(),
            None => records.into_iter().map(Value::Object).collect(),
        })
    }

    fn to_record(&self, model: &E::Model) -> Result<Record, DbErr> {
        let Value::Object(mut record) =
            serde_json::to_value(model).map_err(|e| DbErr::Json(e.to_string()))?
        else {
            return Err(DbErr::Json("Model did not serialize to an object".to_string()));
        };

        for attribute in self.appends.iter().flatten() {
            let value = E::computed_attribute(model, attribute).unwrap_or(Value::Null);
            record.insert(attribute.clone(), value);
        }

        Ok(record)
    }
}
