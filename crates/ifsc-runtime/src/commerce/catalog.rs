//! Product catalog backends

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One product or variation with a non-empty SKU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuRow {
    pub product_id: u64,
    pub sku: String,
}

/// Result of a limited SKU query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuRows {
    pub rows: Vec<SkuRow>,
    /// Rows that would match without the limit
    pub found_rows: usize,
}

/// Trait for product catalogs
pub trait ProductCatalog: Send + Sync {
    /// Up to `limit` SKU rows of products and variations
    fn sku_rows(&self, limit: usize) -> Result<SkuRows>;

    /// Single-item SKU lookup, `0` when unknown
    fn product_id_by_sku(&self, sku: &str) -> Result<u64>;

    /// Whether the customer has an order containing the product or one of
    /// its variations
    fn customer_bought_product(&self, user_id: u64, product_id: u64) -> Result<bool>;

    /// Whether the customer holds a live download permission for the
    /// product or one of its variations
    fn customer_can_download(&self, user_id: u64, product_id: u64) -> Result<bool>;
}

/// A product or variation in a [`MemoryCatalog`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    #[serde(default)]
    pub sku: String,
    /// Parent product for variations
    #[serde(default)]
    pub parent_id: Option<u64>,
}

/// In-memory product catalog
///
/// Suitable for fixtures and tests. Counts SKU queries so callers can
/// observe caching.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MemoryCatalog {
    products: Vec<ProductRecord>,
    /// `(user_id, product_id)` order lines
    purchases: HashSet<(u64, u64)>,
    /// `(user_id, product_id)` download permissions
    downloads: HashSet<(u64, u64)>,
    #[serde(skip)]
    sku_queries: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, id: u64, sku: impl Into<String>) -> Self {
        self.products.push(ProductRecord {
            id,
            sku: sku.into(),
            parent_id: None,
        });
        self
    }

    pub fn with_variation(mut self, id: u64, parent_id: u64, sku: impl Into<String>) -> Self {
        self.products.push(ProductRecord {
            id,
            sku: sku.into(),
            parent_id: Some(parent_id),
        });
        self
    }

    pub fn with_purchase(mut self, user_id: u64, product_id: u64) -> Self {
        self.purchases.insert((user_id, product_id));
        self
    }

    pub fn with_download(mut self, user_id: u64, product_id: u64) -> Self {
        self.downloads.insert((user_id, product_id));
        self
    }

    /// Number of `sku_rows` calls so far
    pub fn sku_queries(&self) -> usize {
        self.sku_queries.load(Ordering::Relaxed)
    }

    fn parent_of(&self, product_id: u64) -> Option<u64> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .and_then(|p| p.parent_id)
    }

    // A line for a variation also counts for its parent
    fn matches(&self, set: &HashSet<(u64, u64)>, user_id: u64, product_id: u64) -> bool {
        set.iter().any(|&(uid, pid)| {
            uid == user_id && (pid == product_id || self.parent_of(pid) == Some(product_id))
        })
    }
}

impl ProductCatalog for MemoryCatalog {
    fn sku_rows(&self, limit: usize) -> Result<SkuRows> {
        self.sku_queries.fetch_add(1, Ordering::Relaxed);

        let matching: Vec<_> = self.products.iter().filter(|p| !p.sku.is_empty()).collect();
        Ok(SkuRows {
            found_rows: matching.len(),
            rows: matching
                .into_iter()
                .take(limit)
                .map(|p| SkuRow {
                    product_id: p.id,
                    sku: p.sku.clone(),
                })
                .collect(),
        })
    }

    fn product_id_by_sku(&self, sku: &str) -> Result<u64> {
        Ok(self
            .products
            .iter()
            .find(|p| !p.sku.is_empty() && p.sku == sku)
            .map(|p| p.id)
            .unwrap_or(0))
    }

    fn customer_bought_product(&self, user_id: u64, product_id: u64) -> Result<bool> {
        Ok(self.matches(&self.purchases, user_id, product_id))
    }

    fn customer_can_download(&self, user_id: u64, product_id: u64) -> Result<bool> {
        Ok(self.matches(&self.downloads, user_id, product_id))
    }
}
