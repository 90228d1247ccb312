//! Product id resolution with a cached SKU map, plus a request-scoped memo
//! for purchase and download checks.

use super::catalog::ProductCatalog;
use super::transient::TransientStore;
use crate::error::{Result, RuntimeError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Transient key of the SKU map
pub const SKU_TRANSIENT_KEY: &str = "woocommerce_product_ids_by_sku";

/// Maximum number of SKUs kept in the cached map
pub const DEFAULT_SKU_LIMIT: usize = 2500;

/// Lifetime of the cached SKU map
pub const SKU_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Memoized question kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    BoughtProduct,
    CanDownload,
}

/// Answers already computed during the current request
#[derive(Debug, Default)]
pub struct LookupMemo {
    entries: RefCell<HashMap<(LookupKind, u64, String), bool>>,
}

impl LookupMemo {
    pub fn get(&self, kind: LookupKind, user_id: u64, id_or_sku: &str) -> Option<bool> {
        self.entries
            .borrow()
            .get(&(kind, user_id, id_or_sku.to_string()))
            .copied()
    }

    pub fn insert(&self, kind: LookupKind, user_id: u64, id_or_sku: &str, answer: bool) {
        self.entries
            .borrow_mut()
            .insert((kind, user_id, id_or_sku.to_string()), answer);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Commerce lookup adapter
pub struct CommerceLookup {
    catalog: Arc<dyn ProductCatalog>,
    transients: Arc<dyn TransientStore>,
    sku_limit: usize,
    memo: LookupMemo,
}

impl CommerceLookup {
    pub fn new(catalog: Arc<dyn ProductCatalog>, transients: Arc<dyn TransientStore>) -> Self {
        Self {
            catalog,
            transients,
            sku_limit: DEFAULT_SKU_LIMIT,
            memo: LookupMemo::default(),
        }
    }

    /// Override the SKU map row limit
    pub fn with_sku_limit(mut self, limit: usize) -> Self {
        self.sku_limit = limit;
        self
    }

    pub fn sku_limit(&self) -> usize {
        self.sku_limit
    }

    pub fn memo(&self) -> &LookupMemo {
        &self.memo
    }

    /// Resolve a product id or SKU to a product id, `0` when unknown.
    ///
    /// A canonical decimal integer is taken as an id as-is. Variations do
    /// not inherit their parent's SKU.
    pub fn product_id_by_sku(&self, id_or_sku: &str) -> Result<u64> {
        if let Some(id) = canonical_id(id_or_sku) {
            return Ok(id);
        }
        match self.product_ids_by_sku()? {
            Some(by_sku) => Ok(by_sku.get(id_or_sku).copied().unwrap_or(0)),
            None => self.catalog.product_id_by_sku(id_or_sku),
        }
    }

    /// The SKU map, or `None` when the catalog has more SKUs than the limit
    pub fn product_ids_by_sku(&self) -> Result<Option<HashMap<String, u64>>> {
        if let Some(payload) = self.transients.get(SKU_TRANSIENT_KEY) {
            match serde_json::from_str::<HashMap<String, u64>>(&payload) {
                Ok(by_sku) => return Ok(Some(by_sku)),
                Err(e) => warn!("Discarding unreadable SKU map transient: {}", e),
            }
        }

        let result = self.catalog.sku_rows(self.sku_limit)?;
        if result.found_rows > self.sku_limit {
            debug!(
                "{} SKUs exceed the limit of {}, SKU map disabled",
                result.found_rows, self.sku_limit
            );
            return Ok(None);
        }

        let by_sku: HashMap<String, u64> = result
            .rows
            .into_iter()
            .map(|row| (row.sku, row.product_id))
            .collect();

        let payload = serde_json::to_string(&by_sku)
            .map_err(|e| RuntimeError::LookupFailed(format!("Cannot encode SKU map: {}", e)))?;
        self.transients.set(SKU_TRANSIENT_KEY, payload, SKU_CACHE_TTL);
        debug!("Cached SKU map with {} entries", by_sku.len());

        Ok(Some(by_sku))
    }

    /// Whether the user bought the product (or any of its variations)
    pub fn customer_bought_product(&self, user_id: u64, id_or_sku: &str) -> Result<bool> {
        self.memoized(LookupKind::BoughtProduct, user_id, id_or_sku, |product_id| {
            self.catalog.customer_bought_product(user_id, product_id)
        })
    }

    /// Whether the user may download the product (or any of its variations)
    pub fn customer_can_download(&self, user_id: u64, id_or_sku: &str) -> Result<bool> {
        self.memoized(LookupKind::CanDownload, user_id, id_or_sku, |product_id| {
            self.catalog.customer_can_download(user_id, product_id)
        })
    }

    fn memoized<F>(&self, kind: LookupKind, user_id: u64, id_or_sku: &str, query: F) -> Result<bool>
    where
        F: FnOnce(u64) -> Result<bool>,
    {
        if let Some(answer) = self.memo.get(kind, user_id, id_or_sku) {
            return Ok(answer);
        }

        let answer = match user_id {
            0 => false,
            _ => match self.product_id_by_sku(id_or_sku)? {
                0 => false,
                product_id => query(product_id)?,
            },
        };

        self.memo.insert(kind, user_id, id_or_sku, answer);
        Ok(answer)
    }

    /// Product save hook
    pub fn on_save_product(&self) {
        self.transients.delete(SKU_TRANSIENT_KEY);
    }

    /// Product variation save hook
    pub fn on_save_product_variation(&self) {
        self.transients.delete(SKU_TRANSIENT_KEY);
    }
}

// "42" is an id; "042", "+42" and "42 " are SKUs
fn canonical_id(value: &str) -> Option<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| id.to_string() == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::{MemoryCatalog, MemoryTransientStore};

    fn lookup(catalog: MemoryCatalog) -> (CommerceLookup, Arc<MemoryCatalog>, Arc<MemoryTransientStore>) {
        let catalog = Arc::new(catalog);
        let store = Arc::new(MemoryTransientStore::new());
        let lookup = CommerceLookup::new(catalog.clone(), store.clone());
        (lookup, catalog, store)
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("42"), Some(42));
        assert_eq!(canonical_id("0"), Some(0));
        assert_eq!(canonical_id("042"), None);
        assert_eq!(canonical_id("+42"), None);
        assert_eq!(canonical_id("SKU-1"), None);
    }

    #[test]
    fn test_product_id_by_sku_uses_cached_map() {
        let (lookup, catalog, store) = lookup(MemoryCatalog::new().with_product(7, "BOOK"));

        assert_eq!(lookup.product_id_by_sku("BOOK").unwrap(), 7);
        assert_eq!(lookup.product_id_by_sku("MISSING").unwrap(), 0);
        assert_eq!(lookup.product_id_by_sku("99").unwrap(), 99);
        assert_eq!(catalog.sku_queries(), 1);
        assert!(store.get(SKU_TRANSIENT_KEY).is_some());
    }

    #[test]
    fn test_save_hooks_invalidate_map() {
        let (lookup, catalog, store) = lookup(MemoryCatalog::new().with_product(7, "BOOK"));

        lookup.product_id_by_sku("BOOK").unwrap();
        lookup.on_save_product();
        assert!(store.get(SKU_TRANSIENT_KEY).is_none());

        lookup.product_id_by_sku("BOOK").unwrap();
        lookup.on_save_product_variation();
        lookup.product_id_by_sku("BOOK").unwrap();
        assert_eq!(catalog.sku_queries(), 3);
    }

    #[test]
    fn test_memo_per_user_and_product() {
        let (lookup, _catalog, _store) =
            lookup(MemoryCatalog::new().with_product(7, "BOOK").with_purchase(1, 7));

        assert!(lookup.customer_bought_product(1, "BOOK").unwrap());
        assert!(!lookup.customer_bought_product(2, "BOOK").unwrap());
        assert!(!lookup.customer_bought_product(0, "BOOK").unwrap());
        assert!(!lookup.customer_can_download(1, "BOOK").unwrap());
        assert_eq!(lookup.memo().len(), 4);

        lookup.memo().clear();
        assert!(lookup.memo().is_empty());
    }
}
