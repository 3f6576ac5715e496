//! HTTP API server for the catalog and point-of-sale engine.
//!
//! Fronts the sale processor, the stock cache and the publish pipeline
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use publish::{CatalogSink, DependentRefresh, FileBlobSink, JsonPostSink, PublishPipeline};
use sales::{InMemoryCache, ProcessLock, SaleProcessor, SemaphoreLock, StockCache};
use tablestore::TableStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use publish::ConditionalPutSink;
use routes::sales::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/sales", post(routes::sales::create))
        .route("/sales/{id}", delete(routes::sales::cancel))
        .route("/publish", post(routes::publish::run))
        .route("/catalog", get(routes::catalog::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Rebuilds the stock cache after a publish so the next sale starts from
/// fresh table content.
struct StockRefresh {
    stock: Arc<StockCache>,
}

#[async_trait]
impl DependentRefresh for StockRefresh {
    async fn refresh(&self) -> Result<(), String> {
        self.stock.rebuild().await.map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Wires the default application state: one lock domain shared by the
/// sale processor and the stock cache, and a publish pipeline built from
/// the configured sinks.
pub fn create_default_state(store: Arc<dyn TableStore>, config: &Config) -> Arc<AppState> {
    let lock: Arc<dyn ProcessLock> = Arc::new(SemaphoreLock::new());
    let cache = Arc::new(InMemoryCache::new());
    let stock = Arc::new(StockCache::new(
        store.clone(),
        cache,
        lock.clone(),
        config.cache_ttl,
        config.lock_timeout,
    ));
    let processor = SaleProcessor::new(store.clone(), stock.clone(), lock, config.sales_config());

    let primary: Arc<dyn CatalogSink> = Arc::new(FileBlobSink::new(config.blob_dir.clone()));
    let mut pipeline = PublishPipeline::new(
        store.clone(),
        config.catalog_config(),
        primary,
        config.snapshot_name.clone(),
    )
    .with_target(config.publish_target.parse().unwrap_or_default())
    .with_refresh(Arc::new(StockRefresh {
        stock: stock.clone(),
    }));

    let client = reqwest::Client::new();
    for (i, endpoint) in config.post_endpoints.iter().enumerate() {
        pipeline = pipeline.with_secondary(Arc::new(JsonPostSink::new(
            format!("hosting-{i}"),
            client.clone(),
            endpoint.clone(),
        )));
    }
    if let Some(endpoint) = &config.conditional_endpoint {
        pipeline = pipeline.with_secondary(Arc::new(ConditionalPutSink::new(
            "revisioned-host",
            client.clone(),
            endpoint.clone(),
        )));
    }

    Arc::new(AppState {
        store,
        catalog_config: config.catalog_config(),
        processor,
        stock,
        pipeline,
    })
}
