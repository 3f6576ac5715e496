//! Catalog snapshot builder.
//!
//! A snapshot is a pure function of the current table content: no caching,
//! no side effects, deterministic output for identical input.

use std::collections::HashMap;

use common::ProductCode;
use records::{
    AgencyRow, CategoryRow, ColorRow, IconRow, ImageRow, InventoryRow, PriceTier, Product, tables,
};
use tablestore::{HeaderIndex, RetryPolicy, Row, TableStore, TableStoreError};
use tracing::warn;

use crate::document::{
    CatalogDocument, CatalogEntry, CategoryGroup, ParentCategoryGroup, ShippingAgency,
    VariantOffer,
};
use crate::error::{CatalogError, Result};
use crate::grouping::{self, GroupingOptions};
use crate::images;

/// Passthrough storefront fields carried verbatim into the document.
#[derive(Debug, Clone, Default)]
pub struct Branding {
    pub store_url: String,
    pub store_logo: String,
    pub store_banner: String,
    pub carousel: Vec<String>,
    pub contact: String,
    pub payment_methods: Vec<String>,
    pub transfer_accounts: Vec<String>,
    pub apply_watermark: bool,
}

/// Build-time options for one snapshot.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Store whose inventory feeds the stock breakdowns.
    pub store: String,
    pub max_images: usize,
    pub exclude_assorted_variants: bool,
    pub placeholder_image: String,
    /// Retry discipline applied to every table load.
    pub retry: RetryPolicy,
    pub branding: Branding,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store: "MAIN".to_string(),
            max_images: 4,
            exclude_assorted_variants: false,
            placeholder_image: String::new(),
            retry: RetryPolicy::default(),
            branding: Branding::default(),
        }
    }
}

/// Builds one catalog snapshot from the current table content.
#[tracing::instrument(skip_all, fields(store = %config.store))]
pub async fn build_catalog(
    store: &dyn TableStore,
    config: &CatalogConfig,
) -> Result<CatalogDocument> {
    let retry = &config.retry;
    let products = load_required(
        store,
        retry,
        tables::PRODUCTS,
        Product::REQUIRED,
        Product::decode,
    )
    .await?;
    let inventory = load_required(
        store,
        retry,
        tables::INVENTORY,
        InventoryRow::REQUIRED,
        InventoryRow::decode,
    )
    .await?;
    let tiers = load_optional(
        store,
        retry,
        tables::PRICE_TIERS,
        PriceTier::REQUIRED,
        PriceTier::decode,
    )
    .await?;
    let image_rows =
        load_optional(store, retry, tables::IMAGES, ImageRow::REQUIRED, ImageRow::decode).await?;
    let categories = load_optional(
        store,
        retry,
        tables::CATEGORIES,
        CategoryRow::REQUIRED,
        CategoryRow::decode,
    )
    .await?;
    let icons =
        load_optional(store, retry, tables::ICONS, IconRow::REQUIRED, IconRow::decode).await?;
    let colors =
        load_optional(store, retry, tables::COLORS, ColorRow::REQUIRED, ColorRow::decode).await?;
    let agencies = load_optional(
        store,
        retry,
        tables::AGENCIES,
        AgencyRow::REQUIRED,
        AgencyRow::decode,
    )
    .await?;

    let product_by_code: HashMap<&str, &Product> =
        products.iter().map(|p| (p.code.as_str(), p)).collect();
    let icon_by_category: HashMap<&str, &str> = icons
        .iter()
        .map(|i| (i.category.as_str(), i.url.as_str()))
        .collect();
    let category_by_name: HashMap<&str, &CategoryRow> =
        categories.iter().map(|c| (c.name.as_str(), c)).collect();
    let hex_by_color: HashMap<String, String> = colors
        .iter()
        .map(|c| (c.name.clone(), c.hex.clone()))
        .collect();

    let mut images_by_product: HashMap<&str, Vec<ImageRow>> = HashMap::new();
    for row in &image_rows {
        images_by_product
            .entry(row.product.as_str())
            .or_default()
            .push(row.clone());
    }

    let mut inventory_by_product: HashMap<ProductCode, Vec<InventoryRow>> = HashMap::new();
    for row in inventory {
        if row.key.store == config.store {
            inventory_by_product
                .entry(row.key.product.clone())
                .or_default()
                .push(row);
        }
    }

    // Visible tiers sorted for consecutive grouping. Downstream consumers
    // diff snapshots, so the sort must be stable and total.
    let mut sorted: Vec<&PriceTier> = tiers
        .iter()
        .filter(|t| t.visible)
        .filter(|t| {
            let known = product_by_code.contains_key(t.product.as_str());
            if !known {
                warn!(product = %t.product, tier = %t.name, "Price tier references unknown product, skipping");
            }
            known
        })
        .collect();
    sorted.sort_by(|a, b| {
        let ca = &product_by_code[a.product.as_str()].category;
        let cb = &product_by_code[b.product.as_str()].category;
        ca.cmp(cb)
            .then_with(|| a.product.cmp(&b.product))
            .then_with(|| b.updated_at.cmp(&a.updated_at))
            .then_with(|| a.name.cmp(&b.name))
    });

    let options = GroupingOptions {
        exclude_assorted_variants: config.exclude_assorted_variants,
    };
    let empty_inventory: Vec<InventoryRow> = Vec::new();

    let mut groups: Vec<CategoryGroup> = Vec::new();
    for tier in sorted {
        let product = product_by_code[tier.product.as_str()];
        let rows = inventory_by_product
            .get(&product.code)
            .unwrap_or(&empty_inventory);

        if groups.last().map(|g| g.name.as_str()) != Some(product.category.as_str()) {
            let row = category_by_name.get(product.category.as_str());
            groups.push(CategoryGroup {
                code: row.map(|c| c.code.clone()).unwrap_or_default(),
                name: product.category.clone(),
                icon_url: icon_by_category
                    .get(product.category.as_str())
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                products: Vec::new(),
            });
        }
        let Some(group) = groups.last_mut() else {
            continue;
        };

        if group.products.last().map(|p| p.code.as_str()) != Some(product.code.as_str()) {
            group.products.push(CatalogEntry {
                code: product.code.as_str().to_string(),
                category_name: product.category.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                images: images::select_images(
                    images_by_product
                        .get(product.code.as_str())
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                    config.max_images,
                    &config.placeholder_image,
                ),
                variants: Vec::new(),
                last_updated: String::new(),
            });
        }
        let entry = match group.products.last_mut() {
            Some(entry) => entry,
            None => continue,
        };

        let published = records_timestamp(tier);
        if entry.last_updated.as_str() < published.as_str() {
            entry.last_updated = published;
        }
        entry.variants.push(VariantOffer {
            currency: tier.currency.clone(),
            price: tier.price.as_major(),
            variant_name: tier.name.clone(),
            min_qty: tier.min_qty,
            stock_breakdown: grouping::stock_breakdown(
                tier.kind,
                rows,
                product,
                &hex_by_color,
                options,
            ),
        });
    }

    // Regroup under parent categories; both levels sorted by name,
    // independently of the grouping sort above.
    let mut parents: Vec<ParentCategoryGroup> = Vec::new();
    for group in groups {
        let parent_name = category_by_name
            .get(group.name.as_str())
            .map(|c| c.parent.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| group.name.clone());
        match parents.iter_mut().find(|p| p.parent_category_name == parent_name) {
            Some(parent) => parent.categories.push(group),
            None => parents.push(ParentCategoryGroup {
                parent_category_name: parent_name,
                categories: vec![group],
            }),
        }
    }
    parents.sort_by(|a, b| a.parent_category_name.cmp(&b.parent_category_name));
    for parent in &mut parents {
        parent.categories.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let branding = &config.branding;
    Ok(CatalogDocument {
        status: 200,
        message: "ok".to_string(),
        store_url: branding.store_url.clone(),
        store_logo: branding.store_logo.clone(),
        store_banner: branding.store_banner.clone(),
        shipping_agencies: agencies
            .into_iter()
            .map(|a| ShippingAgency {
                name: a.name,
                logo: a.logo,
                destinations: a.destinations,
            })
            .collect(),
        carousel: branding.carousel.clone(),
        contact: branding.contact.clone(),
        content: parents,
        payment_methods: branding.payment_methods.clone(),
        transfer_accounts: branding.transfer_accounts.clone(),
        apply_watermark: branding.apply_watermark,
    })
}

fn records_timestamp(tier: &PriceTier) -> String {
    tier.updated_at.to_rfc3339()
}

/// Loads and decodes a table the build cannot proceed without.
async fn load_required<T>(
    store: &dyn TableStore,
    retry: &RetryPolicy,
    table: &str,
    required: &[&str],
    decode: impl Fn(&Row, &HeaderIndex) -> records::Result<T>,
) -> Result<Vec<T>> {
    match load_table(store, retry, table, required, decode).await {
        Ok(rows) => Ok(rows),
        Err(CatalogError::Store(TableStoreError::TableNotFound(_))) => {
            Err(CatalogError::MissingTable {
                table: table.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}

/// Loads an optional table; absence or schema problems yield an empty
/// contribution with a warning instead of aborting the build. A store
/// outage that survives the retry budget still aborts: an empty snapshot
/// must never stand in for an unreachable table.
async fn load_optional<T>(
    store: &dyn TableStore,
    retry: &RetryPolicy,
    table: &str,
    required: &[&str],
    decode: impl Fn(&Row, &HeaderIndex) -> records::Result<T>,
) -> Result<Vec<T>> {
    match load_table(store, retry, table, required, decode).await {
        Ok(rows) => Ok(rows),
        Err(CatalogError::Store(err)) if err.is_transient() => Err(CatalogError::Store(err)),
        Err(err) => {
            warn!(table, error = %err, "Optional table unavailable, continuing without it");
            Ok(Vec::new())
        }
    }
}

async fn load_table<T>(
    store: &dyn TableStore,
    retry: &RetryPolicy,
    table: &str,
    required: &[&str],
    decode: impl Fn(&Row, &HeaderIndex) -> records::Result<T>,
) -> Result<Vec<T>> {
    let header = retry.run(|| store.get_header(table)).await?;
    let index = HeaderIndex::build(table, &header);
    index.require_all(required)?;

    let rows = retry.run(|| store.get_rows(table)).await?;
    let mut decoded = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match decode(row, &index) {
            Ok(record) => decoded.push(record),
            Err(err) => warn!(table, row = i, error = %err, "Skipping undecodable row"),
        }
    }
    Ok(decoded)
}
