use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catalog::{CatalogConfig, CatalogError, build_catalog};
use common::ASSORTED;
use records::{
    AgencyRow, CategoryRow, ColorRow, IconRow, ImageRow, InventoryRow, PriceTier, Product, tables,
};
use tablestore::{
    Cell, InMemoryTableStore, RetryPolicy, Row, RowStream, TableStore, TableStoreError, row,
};

async fn seeded_store() -> InMemoryTableStore {
    let store = InMemoryTableStore::new();

    store
        .create_table(tables::PRODUCTS, Product::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::PRODUCTS,
            row![
                "P-100",
                "Remera basica",
                "Remeras",
                "ACME",
                "",
                "",
                "",
                "",
                "",
                "Remera de algodon",
                "",
                "",
                false
            ],
        )
        .await
        .unwrap();
    store
        .append_row(
            tables::PRODUCTS,
            row![
                "P-200",
                "Curva remeras",
                "Remeras",
                "ACME",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                false
            ],
        )
        .await
        .unwrap();

    store
        .create_table(tables::INVENTORY, InventoryRow::header())
        .await
        .unwrap();
    for (product, color, size, stock) in [
        ("P-100", "Rojo", "M", 3i64),
        ("P-100", "Rojo", "L", 2),
        ("P-100", "Azul", "M", 1),
        ("P-200", "Red", ASSORTED, 5),
        ("P-200", "Blue", ASSORTED, 3),
    ] {
        store
            .append_row(
                tables::INVENTORY,
                row!["MAIN", product, color, size, stock, 0i64, 0i64, 0i64],
            )
            .await
            .unwrap();
    }

    store
        .create_table(tables::PRICE_TIERS, PriceTier::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::PRICE_TIERS,
            row!["P-100", "Unidad", 100.0, "ARS", 1i64, true, "2024-05-01T00:00:00Z"],
        )
        .await
        .unwrap();
    store
        .append_row(
            tables::PRICE_TIERS,
            row!["P-200", "Curva", 900.0, "ARS", 8i64, true, "2024-05-02T00:00:00Z"],
        )
        .await
        .unwrap();
    store
        .append_row(
            tables::PRICE_TIERS,
            row!["P-100", "Mayorista", 80.0, "ARS", 10i64, false, "2024-05-03T00:00:00Z"],
        )
        .await
        .unwrap();

    store
        .create_table(tables::IMAGES, ImageRow::header())
        .await
        .unwrap();
    for (url, cover, at) in [
        ("https://cdn.example.com/p100.webp", true, "2024-04-01T00:00:00Z"),
        ("https://cdn.example.com/p100.jpg", false, "2024-04-01T00:00:00Z"),
        ("https://cdn.example.com/p100_thumb.jpg", false, "2024-04-01T00:00:00Z"),
    ] {
        store
            .append_row(tables::IMAGES, row!["P-100", url, cover, at])
            .await
            .unwrap();
    }

    store
        .create_table(tables::CATEGORIES, CategoryRow::header())
        .await
        .unwrap();
    store
        .append_row(tables::CATEGORIES, row!["C-01", "Remeras", "Indumentaria"])
        .await
        .unwrap();

    store
        .create_table(tables::ICONS, IconRow::header())
        .await
        .unwrap();
    store
        .append_row(tables::ICONS, row!["Remeras", "https://cdn.example.com/tee.svg"])
        .await
        .unwrap();

    store
        .create_table(tables::COLORS, ColorRow::header())
        .await
        .unwrap();
    for (name, hex) in [("Rojo", "#FF0000"), ("Azul", "#0000FF"), ("Red", "#FF0000")] {
        store
            .append_row(tables::COLORS, row![name, hex])
            .await
            .unwrap();
    }

    store
        .create_table(tables::AGENCIES, AgencyRow::header())
        .await
        .unwrap();
    store
        .append_row(
            tables::AGENCIES,
            row!["Via Cargo", "https://cdn.example.com/vc.png", "CABA, Cordoba"],
        )
        .await
        .unwrap();

    store
}

fn config() -> CatalogConfig {
    CatalogConfig {
        placeholder_image: "https://cdn.example.com/placeholder.png".to_string(),
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn builds_nested_document() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    assert_eq!(doc.status, 200);
    assert_eq!(doc.shipping_agencies.len(), 1);
    assert_eq!(doc.shipping_agencies[0].destinations, vec!["CABA", "Cordoba"]);

    assert_eq!(doc.content.len(), 1);
    let parent = &doc.content[0];
    assert_eq!(parent.parent_category_name, "Indumentaria");
    assert_eq!(parent.categories.len(), 1);

    let category = &parent.categories[0];
    assert_eq!(category.code, "C-01");
    assert_eq!(category.icon_url, "https://cdn.example.com/tee.svg");
    assert_eq!(category.products.len(), 2);
}

#[tokio::test]
async fn invisible_tiers_are_excluded() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    let p100 = &doc.content[0].categories[0].products[0];
    assert_eq!(p100.code, "P-100");
    assert_eq!(p100.variants.len(), 1);
    assert_eq!(p100.variants[0].variant_name, "Unidad");
}

#[tokio::test]
async fn standard_breakdown_groups_by_color_and_size() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    let breakdown = &doc.content[0].categories[0].products[0].variants[0].stock_breakdown;
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].color, "Azul");
    assert_eq!(breakdown[0].hex, "#0000FF");
    assert_eq!(breakdown[1].color, "Rojo");
    assert_eq!(breakdown[1].sizes.get("M"), Some(&3));
    assert_eq!(breakdown[1].sizes.get("L"), Some(&2));
}

#[tokio::test]
async fn curva_breakdown_per_color() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    let p200 = &doc.content[0].categories[0].products[1];
    assert_eq!(p200.code, "P-200");
    let breakdown = &p200.variants[0].stock_breakdown;
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].color, "Blue");
    assert_eq!(breakdown[0].sizes.get(ASSORTED), Some(&3));
    assert_eq!(breakdown[1].color, "Red");
    assert_eq!(breakdown[1].sizes.get(ASSORTED), Some(&5));
}

#[tokio::test]
async fn webp_preferred_and_thumbnails_dropped() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    let images = &doc.content[0].categories[0].products[0].images;
    assert_eq!(images, &vec!["https://cdn.example.com/p100.webp".to_string()]);
}

#[tokio::test]
async fn placeholder_for_products_without_images() {
    let store = seeded_store().await;
    let doc = build_catalog(&store, &config()).await.unwrap();

    let images = &doc.content[0].categories[0].products[1].images;
    assert_eq!(images, &vec!["https://cdn.example.com/placeholder.png".to_string()]);
}

#[tokio::test]
async fn two_builds_are_byte_identical() {
    let store = seeded_store().await;
    let cfg = config();

    let first = serde_json::to_vec(&build_catalog(&store, &cfg).await.unwrap()).unwrap();
    let second = serde_json::to_vec(&build_catalog(&store, &cfg).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_optional_tables_yield_empty_contribution() {
    let store = InMemoryTableStore::new();
    store
        .create_table(tables::PRODUCTS, Product::header())
        .await
        .unwrap();
    store
        .create_table(tables::INVENTORY, InventoryRow::header())
        .await
        .unwrap();

    let doc = build_catalog(&store, &config()).await.unwrap();
    assert!(doc.content.is_empty());
    assert!(doc.shipping_agencies.is_empty());
}

#[tokio::test]
async fn missing_required_table_is_fatal() {
    let store = InMemoryTableStore::new();
    store
        .create_table(tables::PRODUCTS, Product::header())
        .await
        .unwrap();

    let err = build_catalog(&store, &config()).await.unwrap_err();
    match err {
        CatalogError::MissingTable { table } => assert_eq!(table, tables::INVENTORY),
        other => panic!("unexpected error: {other}"),
    }
}

/// Store wrapper failing reads of one table a configured number of times.
struct OutageStore {
    inner: InMemoryTableStore,
    fail_table: &'static str,
    failures: AtomicU32,
}

impl OutageStore {
    fn new(inner: InMemoryTableStore, fail_table: &'static str, failures: u32) -> Self {
        Self {
            inner,
            fail_table,
            failures: AtomicU32::new(failures),
        }
    }

    fn outage(&self, table: &str) -> Option<TableStoreError> {
        if table == self.fail_table {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Some(TableStoreError::Unavailable("503".to_string()));
            }
        }
        None
    }
}

#[async_trait]
impl TableStore for OutageStore {
    async fn get_header(&self, table: &str) -> tablestore::Result<Row> {
        self.inner.get_header(table).await
    }

    async fn get_rows(&self, table: &str) -> tablestore::Result<Vec<Row>> {
        if let Some(err) = self.outage(table) {
            return Err(err);
        }
        self.inner.get_rows(table).await
    }

    async fn stream_rows(&self, table: &str) -> tablestore::Result<RowStream> {
        self.inner.stream_rows(table).await
    }

    async fn append_row(&self, table: &str, row: Row) -> tablestore::Result<usize> {
        self.inner.append_row(table, row).await
    }

    async fn set_cell(
        &self,
        table: &str,
        row_index: usize,
        col_index: usize,
        cell: Cell,
    ) -> tablestore::Result<()> {
        self.inner.set_cell(table, row_index, col_index, cell).await
    }

    async fn delete_row(&self, table: &str, row_index: usize) -> tablestore::Result<()> {
        self.inner.delete_row(table, row_index).await
    }

    async fn create_table(&self, table: &str, header: Row) -> tablestore::Result<()> {
        self.inner.create_table(table, header).await
    }
}

fn fast_retry_config() -> CatalogConfig {
    CatalogConfig {
        retry: RetryPolicy::new(3, Duration::from_millis(1)),
        ..config()
    }
}

#[tokio::test]
async fn transient_read_failures_are_retried() {
    let store = OutageStore::new(seeded_store().await, tables::INVENTORY, 1);

    let doc = build_catalog(&store, &fast_retry_config()).await.unwrap();
    assert_eq!(doc.content.len(), 1);
    assert_eq!(store.failures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn persistent_outage_on_optional_table_is_fatal() {
    let store = OutageStore::new(seeded_store().await, tables::CATEGORIES, u32::MAX);

    let err = build_catalog(&store, &fast_retry_config()).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Store(TableStoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn branding_fields_pass_through() {
    let store = seeded_store().await;
    let mut cfg = config();
    cfg.branding.store_url = "https://tienda.example.com".to_string();
    cfg.branding.payment_methods = vec!["efectivo".to_string(), "transferencia".to_string()];
    cfg.branding.apply_watermark = true;

    let doc = build_catalog(&store, &cfg).await.unwrap();
    assert_eq!(doc.store_url, "https://tienda.example.com");
    assert_eq!(doc.payment_methods.len(), 2);
    assert!(doc.apply_watermark);
}
