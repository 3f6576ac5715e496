//! Publish trigger endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use publish::PublishReport;

use crate::error::ApiError;
use crate::routes::sales::AppState;

/// POST /publish — run one publish cycle. Returns 200 even for degraded
/// cycles; the report's `success` field carries the verdict.
#[tracing::instrument(skip(state))]
pub async fn run(State(state): State<Arc<AppState>>) -> Result<Json<PublishReport>, ApiError> {
    let report = state.pipeline.publish().await?;
    Ok(Json(report))
}
