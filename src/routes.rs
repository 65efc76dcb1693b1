use crate::errors::ApiError;
use crate::models::{OptionsParams, OptionsRequest};
use crate::options::Options;
use crate::traits::SelectResource;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

/// Shared state of an options endpoint: the connection and its configured resolver.
pub struct OptionsState<E: SelectResource> {
    pub db: DatabaseConnection,
    pub options: Arc<Options<E>>,
}

impl<E: SelectResource> Clone for OptionsState<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            options: Arc::clone(&self.options),
        }
    }
}

/// Option list for a select control.
///
/// # Errors
///
/// Storage failures are returned as a sanitized [`ApiError`].
pub async fn get_options<E>(
    Query(request): Query<OptionsRequest>,
    State(state): State<OptionsState<E>>,
) -> Result<Json<Vec<Value>>, ApiError>
where
    E: SelectResource,
    E::Column: FromStr,
    E::Model: Serialize,
{
    let params = OptionsParams::from_request(&request);
    let items = state.options.respond(&state.db, &params).await?;
    Ok(Json(items))
}

/// Router serving `GET /` from `options`; nest it under the resource's path.
///
/// ```rust,ignore
/// let app = Router::new().nest(
///     "/products/options",
///     options_router(db, Options::new(product::Entity::find(), "id", ["name"])),
/// );
/// ```
pub fn options_router<E>(db: DatabaseConnection, options: Options<E>) -> Router
where
    E: SelectResource,
    E::Column: FromStr,
    E::Model: Serialize,
{
    let state = OptionsState {
        db,
        options: Arc::new(options),
    };
    Router::new()
        .route("/", get(get_options::<E>))
        .with_state(state)
}
