//! Sale processing endpoints and shared application state.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::CatalogConfig;
use publish::PublishPipeline;
use sales::{CancelResult, SaleProcessor, SaleRequest, SaleResult, StockCache};
use tablestore::TableStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub catalog_config: CatalogConfig,
    pub processor: SaleProcessor,
    pub stock: Arc<StockCache>,
    pub pipeline: PublishPipeline,
}

/// POST /sales — commit one point-of-sale transaction.
#[tracing::instrument(skip(state, request), fields(sale_id = %request.sale_id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleResult>), ApiError> {
    let result = state.processor.process_sale(&request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// DELETE /sales/:id — cancel a sale, removing its ledger rows and
/// restoring stock.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CancelResult>, ApiError> {
    let result = state.processor.cancel_sale(&id).await?;
    Ok(Json(result))
}
