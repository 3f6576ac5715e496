//! Catalog snapshot endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::CatalogDocument;

use crate::error::ApiError;
use crate::routes::sales::AppState;

/// GET /catalog — build and return a fresh catalog snapshot.
#[tracing::instrument(skip(state))]
pub async fn get(State(state): State<Arc<AppState>>) -> Result<Json<CatalogDocument>, ApiError> {
    let document = catalog::build_catalog(state.store.as_ref(), &state.catalog_config).await?;
    Ok(Json(document))
}
