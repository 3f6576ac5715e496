//! Point-of-sale processing and the lock-protected stock cache.

pub mod cache;
mod error;
pub mod lock;
mod processor;
mod request;
mod stock;

pub use cache::{EphemeralCache, InMemoryCache};
pub use error::{Result, SalesError};
pub use lock::{LockGuard, ProcessLock, SemaphoreLock};
pub use processor::{SaleProcessor, SalesConfig};
pub use request::{CancelResult, CartItem, SaleRequest, SaleResult};
pub use stock::{STOCK_CACHE_KEY, StockCache};
