//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use records::{InventoryRow, PriceTier, Product, SaleHeader, SaleLine, tables};
use tablestore::{InMemoryTableStore, TableStore, row};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn seeded_store() -> Arc<InMemoryTableStore> {
    let store = Arc::new(InMemoryTableStore::new());
    store
        .create_table(tables::PRODUCTS, Product::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::PRODUCTS,
            row!["P-1", "Remera", "Remeras", "", "", "", "", "", "", "", "", "", false],
        )
        .await
        .unwrap();
    store
        .create_table(tables::INVENTORY, InventoryRow::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::INVENTORY,
            row!["MAIN", "P-1", "Rojo", "M", 10i64, 0i64, 0i64, 0i64],
        )
        .await
        .unwrap();
    store
        .create_table(tables::PRICE_TIERS, PriceTier::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::PRICE_TIERS,
            row!["P-1", "Unidad", 100.0, "ARS", 1i64, true, ""],
        )
        .await
        .unwrap();
    store
        .create_table(tables::SALE_HEADERS, SaleHeader::header())
        .await
        .unwrap();
    store
        .create_table(tables::SALE_LINES, SaleLine::header())
        .await
        .unwrap();
    store
}

async fn setup() -> (axum::Router, Arc<InMemoryTableStore>) {
    let store = seeded_store().await;
    let mut config = api::config::Config::default();
    config.blob_dir = std::env::temp_dir()
        .join(format!("api-blob-{}", std::process::id()))
        .to_string_lossy()
        .into_owned();

    let state = api::create_default_state(store.clone(), &config);
    let app = api::create_app(state, get_metrics_handle());
    (app, store)
}

fn sale_body(sale_id: &str) -> Body {
    Body::from(
        serde_json::to_string(&serde_json::json!({
            "saleId": sale_id,
            "storeId": "MAIN",
            "paymentMethod": "efectivo",
            "cart": [
                {"productId": "P-1", "color": "Rojo", "size": "M", "price": 100.0, "quantity": 2}
            ]
        }))
        .unwrap(),
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_check() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "catalog-engine");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn catalog_snapshot() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["content"][0]["categories"][0]["name"], "Remeras");
    let breakdown = &json["content"][0]["categories"][0]["products"][0]["variants"][0]
        ["stockBreakdown"][0];
    assert_eq!(breakdown["color"], "Rojo");
    assert_eq!(breakdown["sizes"]["M"], 10);
}

#[tokio::test]
async fn create_sale_commits_and_decrements() {
    let (app, store) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sales")
                .header("content-type", "application/json")
                .body(sale_body("S-1"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["saleId"], "S-1");
    assert_eq!(json["subtotal"], 200.0);
    assert_eq!(json["totalAmount"], 200.0);
    assert_eq!(json["committedLines"], 1);

    assert_eq!(store.get_rows(tables::SALE_HEADERS).await.unwrap().len(), 1);
    assert_eq!(store.get_rows(tables::SALE_LINES).await.unwrap().len(), 1);
    let inventory = store.get_rows(tables::INVENTORY).await.unwrap();
    assert_eq!(inventory[0].cell(4).as_i64(), Some(8));
}

#[tokio::test]
async fn create_sale_with_empty_cart_is_rejected() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sales")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "saleId": "S-2",
                        "storeId": "MAIN",
                        "cart": []
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn cancel_sale_roundtrip() {
    let (app, store) = setup().await;

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sales")
                .header("content-type", "application/json")
                .body(sale_body("S-3"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::CREATED);

    let cancel = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/sales/S-3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(cancel.status(), StatusCode::OK);
    let json = body_json(cancel).await;
    assert_eq!(json["removedLines"], 1);

    assert!(store.get_rows(tables::SALE_HEADERS).await.unwrap().is_empty());
    let inventory = store.get_rows(tables::INVENTORY).await.unwrap();
    assert_eq!(inventory[0].cell(4).as_i64(), Some(10));
}

#[tokio::test]
async fn cancel_unknown_sale_is_not_found() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/sales/S-none")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn publish_reports_per_sink_outcomes() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/publish")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["sinks"][0]["sink"], "blob");
    assert_eq!(json["sinks"][0]["ok"], true);
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/plain"));
}
