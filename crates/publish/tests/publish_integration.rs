use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use catalog::CatalogConfig;
use publish::{DependentRefresh, MemorySink, PublishError, PublishPipeline, PublishTarget};
use records::{InventoryRow, PriceTier, Product, tables};
use tablestore::{InMemoryTableStore, TableStore, row};

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
            row!["MAIN", "P-1", "Rojo", "M", 5i64, 0i64, 0i64, 0i64],
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
}

fn pipeline(
    store: Arc<InMemoryTableStore>,
    primary: Arc<MemorySink>,
) -> PublishPipeline {
    PublishPipeline::new(store, CatalogConfig::default(), primary, "catalogo.json")
}

#[tokio::test]
async fn single_snapshot_shared_by_all_sinks() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let secondary_a = Arc::new(MemorySink::new("hosting-a"));
    let secondary_b = Arc::new(MemorySink::new("hosting-b"));

    let report = pipeline(store, primary.clone())
        .with_secondary(secondary_a.clone())
        .with_secondary(secondary_b.clone())
        .publish()
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.sinks.len(), 3);
    assert!(report.sinks.iter().all(|s| s.ok));

    let (name, payload) = primary.last_upload().unwrap();
    assert_eq!(name, "catalogo.json");
    assert_eq!(secondary_a.last_upload().unwrap().1, payload);
    assert_eq!(secondary_b.last_upload().unwrap().1, payload);
}

#[tokio::test]
async fn primary_failure_aborts_the_cycle() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    primary.set_fail(true);
    let secondary = Arc::new(MemorySink::new("hosting"));

    let err = pipeline(store, primary)
        .with_secondary(secondary.clone())
        .publish()
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Primary { .. }));
    assert_eq!(secondary.upload_count(), 0);
}

#[tokio::test]
async fn secondary_failures_never_abort_the_others() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let failing = Arc::new(MemorySink::new("hosting-a"));
    failing.set_fail(true);
    let healthy = Arc::new(MemorySink::new("hosting-b"));

    let report = pipeline(store, primary)
        .with_secondary(failing)
        .with_secondary(healthy.clone())
        .publish()
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(healthy.upload_count(), 1);
    let failed: Vec<_> = report.sinks.iter().filter(|s| !s.ok).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].sink, "hosting-a");
    assert!(!failed[0].message.is_empty());
}

#[tokio::test]
async fn all_secondaries_failing_is_a_degraded_cycle() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let failing = Arc::new(MemorySink::new("hosting"));
    failing.set_fail(true);

    let report = pipeline(store, primary.clone())
        .with_secondary(failing)
        .publish()
        .await
        .unwrap();

    // Primary persisted, so the cycle completes, but the verdict reports
    // the degradation with the failure listed.
    assert!(!report.success);
    assert_eq!(primary.upload_count(), 1);
    assert_eq!(report.sinks.len(), 2);
}

#[tokio::test]
async fn no_secondaries_means_primary_alone_decides() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));

    let report = pipeline(store, primary).publish().await.unwrap();
    assert!(report.success);
    assert_eq!(report.sinks.len(), 1);
}

#[tokio::test]
async fn primary_only_target_skips_secondaries() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let secondary = Arc::new(MemorySink::new("hosting"));

    let report = pipeline(store, primary)
        .with_secondary(secondary.clone())
        .with_target(PublishTarget::PrimaryOnly)
        .publish()
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(secondary.upload_count(), 0);
}

#[tokio::test]
async fn secondary_only_target_skips_primary() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let secondary = Arc::new(MemorySink::new("hosting"));

    let report = pipeline(store, primary.clone())
        .with_secondary(secondary.clone())
        .with_target(PublishTarget::SecondaryOnly)
        .publish()
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(primary.upload_count(), 0);
    assert_eq!(secondary.upload_count(), 1);
}

struct FlakyRefresh {
    calls: AtomicU32,
    fail: AtomicBool,
}

#[async_trait]
impl DependentRefresh for FlakyRefresh {
    async fn refresh(&self) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err("refresh endpoint unreachable".to_string())
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn refresh_failure_never_affects_the_outcome() {
    let store = seeded_store().await;
    let primary = Arc::new(MemorySink::new("blob"));
    let refresh = Arc::new(FlakyRefresh {
        calls: AtomicU32::new(0),
        fail: AtomicBool::new(true),
    });

    let report = pipeline(store, primary)
        .with_refresh(refresh.clone())
        .publish()
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(refresh.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn aggregator_failure_is_fatal() {
    let store = Arc::new(InMemoryTableStore::new());
    let primary = Arc::new(MemorySink::new("blob"));

    let err = pipeline(store, primary.clone()).publish().await.unwrap_err();
    assert!(matches!(err, PublishError::Catalog(_)));
    assert_eq!(primary.upload_count(), 0);
}
