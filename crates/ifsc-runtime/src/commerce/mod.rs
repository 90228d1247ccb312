//! Commerce lookups
//!
//! Resolves product ids or SKUs and answers purchase/download questions for
//! the `current_user_bought_product` attribute. The catalog and the
//! transient cache are host collaborators behind traits.

mod catalog;
mod lookup;
mod transient;

pub use catalog::{MemoryCatalog, ProductCatalog, ProductRecord, SkuRow, SkuRows};
pub use lookup::{
    CommerceLookup, LookupKind, LookupMemo, DEFAULT_SKU_LIMIT, SKU_CACHE_TTL, SKU_TRANSIENT_KEY,
};
pub use transient::{MemoryTransientStore, TransientStore};
