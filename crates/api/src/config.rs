//! Application configuration loaded from environment variables.

use std::collections::HashMap;
use std::time::Duration;

use catalog::{Branding, CatalogConfig};
use common::Money;
use sales::SalesConfig;

/// Server and engine configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` / `PORT` — bind address (default `0.0.0.0:3000`)
/// - `RUST_LOG` — tracing filter directive (default `"info"`)
/// - `DATABASE_URL` — PostgreSQL store; unset means in-memory
/// - `STORE_ID` — store whose inventory is served (default `"MAIN"`)
/// - `LOCK_TIMEOUT_MS` — sale lock bounded wait (default `30000`)
/// - `CACHE_TTL_SECS` — stock cache TTL (default `600`)
/// - `MAX_IMAGES` — published images per product (default `4`)
/// - `EXCLUDE_ASSORTED_VARIANTS` — drop sentinel rows from standard
///   breakdowns (default `false`)
/// - `SHIPPING_COST` — flat shipping in major units (default `0`)
/// - `SURCHARGES` — `method:pct` pairs, comma separated
/// - `PUBLISH_TARGET` — `all`, `primary_only` or `secondary_only`
/// - `BLOB_DIR` / `SNAPSHOT_NAME` — primary sink location
/// - `POST_ENDPOINTS` — secondary HTTP push endpoints, comma separated
/// - `CONDITIONAL_ENDPOINT` — revisioned file host base URL
/// - branding passthrough: `STORE_URL`, `STORE_LOGO`, `STORE_BANNER`,
///   `CONTACT`, `CAROUSEL`, `PAYMENT_METHODS`, `TRANSFER_ACCOUNTS`,
///   `APPLY_WATERMARK`, `PLACEHOLDER_IMAGE`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub store_id: String,
    pub lock_timeout: Duration,
    pub cache_ttl: Duration,
    pub max_images: usize,
    pub exclude_assorted_variants: bool,
    pub shipping_cost: Money,
    pub surcharges: HashMap<String, f64>,
    pub publish_target: String,
    pub blob_dir: String,
    pub snapshot_name: String,
    pub post_endpoints: Vec<String>,
    pub conditional_endpoint: Option<String>,
    pub placeholder_image: String,
    pub store_url: String,
    pub store_logo: String,
    pub store_banner: String,
    pub contact: String,
    pub carousel: Vec<String>,
    pub payment_methods: Vec<String>,
    pub transfer_accounts: Vec<String>,
    pub apply_watermark: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parsed_var("PORT").unwrap_or(3000),
            log_level: var_or("RUST_LOG", "info"),
            database_url: std::env::var("DATABASE_URL").ok(),
            store_id: var_or("STORE_ID", "MAIN"),
            lock_timeout: Duration::from_millis(parsed_var("LOCK_TIMEOUT_MS").unwrap_or(30_000)),
            cache_ttl: Duration::from_secs(parsed_var("CACHE_TTL_SECS").unwrap_or(600)),
            max_images: parsed_var("MAX_IMAGES").unwrap_or(4),
            exclude_assorted_variants: parsed_var("EXCLUDE_ASSORTED_VARIANTS").unwrap_or(false),
            shipping_cost: Money::from_major(parsed_var("SHIPPING_COST").unwrap_or(0.0)),
            surcharges: parse_surcharges(&var_or("SURCHARGES", "")),
            publish_target: var_or("PUBLISH_TARGET", "all"),
            blob_dir: var_or("BLOB_DIR", "./published"),
            snapshot_name: var_or("SNAPSHOT_NAME", "catalogo.json"),
            post_endpoints: parse_list(&var_or("POST_ENDPOINTS", "")),
            conditional_endpoint: std::env::var("CONDITIONAL_ENDPOINT").ok(),
            placeholder_image: var_or("PLACEHOLDER_IMAGE", ""),
            store_url: var_or("STORE_URL", ""),
            store_logo: var_or("STORE_LOGO", ""),
            store_banner: var_or("STORE_BANNER", ""),
            contact: var_or("CONTACT", ""),
            carousel: parse_list(&var_or("CAROUSEL", "")),
            payment_methods: parse_list(&var_or("PAYMENT_METHODS", "")),
            transfer_accounts: parse_list(&var_or("TRANSFER_ACCOUNTS", "")),
            apply_watermark: parsed_var("APPLY_WATERMARK").unwrap_or(false),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Catalog build options derived from this configuration.
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            store: self.store_id.clone(),
            max_images: self.max_images,
            exclude_assorted_variants: self.exclude_assorted_variants,
            placeholder_image: self.placeholder_image.clone(),
            retry: tablestore::RetryPolicy::default(),
            branding: Branding {
                store_url: self.store_url.clone(),
                store_logo: self.store_logo.clone(),
                store_banner: self.store_banner.clone(),
                carousel: self.carousel.clone(),
                contact: self.contact.clone(),
                payment_methods: self.payment_methods.clone(),
                transfer_accounts: self.transfer_accounts.clone(),
                apply_watermark: self.apply_watermark,
            },
        }
    }

    /// Sale-processing options derived from this configuration.
    pub fn sales_config(&self) -> SalesConfig {
        SalesConfig {
            lock_timeout: self.lock_timeout,
            shipping_cost: self.shipping_cost,
            surcharges: self.surcharges.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            store_id: "MAIN".to_string(),
            lock_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(600),
            max_images: 4,
            exclude_assorted_variants: false,
            shipping_cost: Money::zero(),
            surcharges: HashMap::new(),
            publish_target: "all".to_string(),
            blob_dir: "./published".to_string(),
            snapshot_name: "catalogo.json".to_string(),
            post_endpoints: Vec::new(),
            conditional_endpoint: None,
            placeholder_image: String::new(),
            store_url: String::new(),
            store_logo: String::new(),
            store_banner: String::new(),
            contact: String::new(),
            carousel: Vec::new(),
            payment_methods: Vec::new(),
            transfer_accounts: Vec::new(),
            apply_watermark: false,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `method:pct` pairs, e.g. `"transferencia:10,tarjeta:5.5"`.
fn parse_surcharges(raw: &str) -> HashMap<String, f64> {
    let mut surcharges = HashMap::new();
    for pair in raw.split(',') {
        if let Some((method, pct)) = pair.split_once(':')
            && let Ok(pct) = pct.trim().parse::<f64>()
        {
            surcharges.insert(method.trim().to_lowercase(), pct);
        }
    }
    surcharges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.lock_timeout, Duration::from_secs(30));
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.max_images, 4);
        assert!(!config.exclude_assorted_variants);
    }

    #[test]
    fn surcharge_pairs_parse() {
        let surcharges = parse_surcharges("Transferencia:10, tarjeta : 5.5,bad,also:bad");
        assert_eq!(surcharges.len(), 2);
        assert_eq!(surcharges.get("transferencia"), Some(&10.0));
        assert_eq!(surcharges.get("tarjeta"), Some(&5.5));
    }

    #[test]
    fn list_parsing_trims_and_drops_empties() {
        assert_eq!(parse_list(" a , ,b"), vec!["a", "b"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn derived_configs_carry_settings() {
        let mut config = Config::default();
        config.store_id = "SUCURSAL".to_string();
        config.surcharges.insert("transferencia".to_string(), 10.0);

        assert_eq!(config.catalog_config().store, "SUCURSAL");
        assert_eq!(
            config.sales_config().surcharges.get("transferencia"),
            Some(&10.0)
        );
    }
}
